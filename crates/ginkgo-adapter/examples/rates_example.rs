/*
[INPUT]:  Access token (OANDA_TOKEN) and practice account id (OANDA_ACCOUNT)
[OUTPUT]: Instruments, current prices and recent candles
[POS]:    Examples - queued REST queries
[UPDATE]: When adding new rates endpoints
*/

use ginkgo_adapter::*;

/// Example: query rates through the request queue.
///
/// Shows both ways of completing a call: awaiting immediately, and holding
/// the handle while other calls are queued.
#[tokio::main]
async fn main() {
    println!("=== OANDA Rates Example ===\n");

    let token = std::env::var("OANDA_TOKEN").ok();
    let account_id: u64 = std::env::var("OANDA_ACCOUNT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or_default();

    let api = match OandaApi::new(Environment::Practice, token.as_deref()) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Failed to create api: {}", e);
            return;
        }
    };
    if let Err(e) = api.init() {
        eprintln!("Failed to start request queue: {}", e);
        return;
    }
    println!("✓ Request queue started\n");

    match api.get_instruments(account_id, &InstrumentsQuery::default()) {
        Ok(pending) => match pending.await {
            Ok(response) => println!("✓ {} instruments available", response.instruments.len()),
            Err(e) => println!("✗ Instruments failed: {}", e),
        },
        Err(e) => println!("✗ Could not queue instruments: {}", e),
    }

    // Queue both calls before waiting on either
    let prices = api.get_prices(&PricesQuery::new(["EUR_USD", "USD_JPY"]));
    let candles = api.get_history(&CandlesQuery {
        granularity: Some(Granularity::M5),
        count: Some(5),
        ..CandlesQuery::new("EUR_USD")
    });

    if let Ok(pending) = prices {
        match pending.await {
            Ok(response) => {
                for price in response.prices {
                    println!("  {} bid={} ask={} spread={}", price.instrument, price.bid, price.ask, price.spread());
                }
            }
            Err(e) => println!("✗ Prices failed: {}", e),
        }
    }
    if let Ok(pending) = candles {
        match pending.await {
            Ok(response) => println!("✓ {} candles for {}", response.candles.len(), response.instrument),
            Err(e) => println!("✗ Candles failed: {}", e),
        }
    }

    api.deinit().await;
    println!("\n=== Example Complete ===");
}
