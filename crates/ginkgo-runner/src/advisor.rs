/*
[INPUT]:  Rates and events stream traffic
[OUTPUT]: Latest tick and spread range per instrument
[POS]:    Strategy layer - expert advisor callbacks (no order placement)
[UPDATE]: When the advisor starts reacting to prices
*/

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use ginkgo_adapter::stream::Tick;
use ginkgo_adapter::{OandaError, StreamHandler, StreamKind, StreamMessage};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

/// Per-instrument view kept by the advisor
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSnapshot {
    pub last: Tick,
    pub ticks: u64,
    pub min_spread: Decimal,
    pub max_spread: Decimal,
}

impl InstrumentSnapshot {
    fn new(tick: Tick) -> Self {
        let spread = tick.spread();
        Self {
            last: tick,
            ticks: 1,
            min_spread: spread,
            max_spread: spread,
        }
    }

    fn update(&mut self, tick: Tick) {
        let spread = tick.spread();
        self.min_spread = self.min_spread.min(spread);
        self.max_spread = self.max_spread.max(spread);
        self.ticks += 1;
        self.last = tick;
    }
}

#[derive(Debug, Default)]
struct AdvisorState {
    instruments: HashMap<String, InstrumentSnapshot>,
    transactions: u64,
    errors: u64,
    last_event: Option<DateTime<Utc>>,
}

/// Trading strategy hook driven by the streams.
///
/// Shared with the stream tasks through an `Arc`.
#[derive(Debug, Default)]
pub struct ExpertAdvisor {
    state: RwLock<AdvisorState>,
}

impl ExpertAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self, instrument: &str) -> Option<InstrumentSnapshot> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .instruments
            .get(instrument)
            .cloned()
    }

    pub fn last_tick(&self, instrument: &str) -> Option<Tick> {
        self.snapshot(instrument).map(|snapshot| snapshot.last)
    }

    pub fn transaction_count(&self) -> u64 {
        self.state.read().unwrap_or_else(PoisonError::into_inner).transactions
    }

    pub fn error_count(&self) -> u64 {
        self.state.read().unwrap_or_else(PoisonError::into_inner).errors
    }

    pub fn last_event(&self) -> Option<DateTime<Utc>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).last_event
    }

    /// Log one line per tracked instrument
    pub fn log_summary(&self) {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        for (instrument, snapshot) in &state.instruments {
            info!(
                instrument = %instrument,
                ticks = snapshot.ticks,
                bid = %snapshot.last.bid,
                ask = %snapshot.last.ask,
                min_spread = %snapshot.min_spread,
                max_spread = %snapshot.max_spread,
                "advisor instrument summary"
            );
        }
        info!(
            transactions = state.transactions,
            errors = state.errors,
            "advisor summary"
        );
    }

    fn record_tick(&self, tick: Tick) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.last_event = Some(tick.time);
        match state.instruments.get_mut(&tick.instrument) {
            Some(snapshot) => snapshot.update(tick),
            None => {
                debug!(instrument = %tick.instrument, "first tick for instrument");
                state.instruments.insert(tick.instrument.clone(), InstrumentSnapshot::new(tick));
            }
        }
    }
}

impl StreamHandler for ExpertAdvisor {
    fn on_stream(&self, kind: StreamKind, message: StreamMessage) {
        match message {
            StreamMessage::Tick(tick) => {
                if tick.is_halted() {
                    debug!(instrument = %tick.instrument, "halted instrument tick");
                }
                self.record_tick(tick);
            }
            StreamMessage::Transaction(transaction) => {
                info!(
                    id = transaction.id,
                    account_id = transaction.account_id,
                    kind = %transaction.kind,
                    instrument = transaction.instrument.as_deref().unwrap_or("-"),
                    "account event"
                );
                let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
                state.transactions += 1;
                state.last_event = Some(transaction.time);
            }
            StreamMessage::Heartbeat(heartbeat) => {
                debug!(stream = %kind, time = %heartbeat.time, "heartbeat");
            }
            StreamMessage::Other(value) => {
                debug!(stream = %kind, message = %value, "unhandled stream message");
            }
        }
    }

    fn on_error(&self, kind: StreamKind, error: OandaError) {
        warn!(stream = %kind, error = %error, "{kind}: stream error");
        self.state.write().unwrap_or_else(PoisonError::into_inner).errors += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn tick(instrument: &str, bid: &str, ask: &str) -> StreamMessage {
        StreamMessage::Tick(Tick {
            instrument: instrument.to_string(),
            time: "2014-01-30T20:47:08Z".parse().unwrap(),
            bid: Decimal::from_str(bid).unwrap(),
            ask: Decimal::from_str(ask).unwrap(),
            status: None,
        })
    }

    #[test]
    fn test_tracks_last_tick_and_spread_range() {
        let advisor = ExpertAdvisor::new();
        advisor.on_stream(StreamKind::Rates, tick("EUR_USD", "1.3613", "1.3615"));
        advisor.on_stream(StreamKind::Rates, tick("EUR_USD", "1.3614", "1.3620"));
        advisor.on_stream(StreamKind::Rates, tick("AUD_CAD", "0.98114", "0.98139"));

        let eur = advisor.snapshot("EUR_USD").unwrap();
        assert_eq!(eur.ticks, 2);
        assert_eq!(eur.last.bid, Decimal::from_str("1.3614").unwrap());
        assert_eq!(eur.min_spread, Decimal::from_str("0.0002").unwrap());
        assert_eq!(eur.max_spread, Decimal::from_str("0.0006").unwrap());
        assert!(advisor.last_tick("AUD_CAD").is_some());
        assert!(advisor.last_tick("USD_JPY").is_none());
        assert!(advisor.last_event().is_some());
    }

    #[test]
    fn test_counts_errors() {
        let advisor = ExpertAdvisor::new();
        advisor.on_error(StreamKind::Events, OandaError::Stream("status 503: maintenance".into()));
        advisor.on_stream(StreamKind::Events, StreamMessage::Other(serde_json::json!({ "x": 1 })));
        assert_eq!(advisor.error_count(), 1);
        assert_eq!(advisor.transaction_count(), 0);
    }
}
