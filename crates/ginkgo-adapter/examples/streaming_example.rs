/*
[INPUT]:  Access token (OANDA_TOKEN) and practice account id (OANDA_ACCOUNT)
[OUTPUT]: Live ticks printed for a few seconds
[POS]:    Examples - rates stream
[UPDATE]: When stream handling changes
*/

use std::time::Duration;

use ginkgo_adapter::*;

/// Example: consume the rates stream through a channel
#[tokio::main]
async fn main() {
    println!("=== OANDA Streaming Example ===\n");

    let token = std::env::var("OANDA_TOKEN").ok();
    let account_id: u64 = std::env::var("OANDA_ACCOUNT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or_default();

    let stream = match OandaStream::new(Environment::Practice, token.as_deref(), StreamKind::Rates) {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("Failed to create stream: {}", e);
            return;
        }
    };

    let query = StreamQuery::rates(account_id, ["EUR_USD", "USD_CAD"]).ignore_heartbeat(true);
    let mut rx = match stream.start_channel(&query) {
        Ok(rx) => rx,
        Err(e) => {
            eprintln!("Failed to start stream: {}", e);
            return;
        }
    };
    println!("✓ Rates stream started\n");

    let deadline = tokio::time::sleep(Duration::from_secs(10));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            event = rx.recv() => match event {
                Some(StreamEvent::Message(_, StreamMessage::Tick(tick))) => {
                    println!("  {} {} bid={} ask={}", tick.time, tick.instrument, tick.bid, tick.ask);
                }
                Some(StreamEvent::Message(kind, other)) => println!("  {}: {:?}", kind, other),
                Some(StreamEvent::Error(kind, e)) => println!("✗ {}: {}", kind, e),
                None => break,
            },
        }
    }

    stream.stop().await;
    println!("\n=== Example Complete ===");
}
