//! Price tracker: the scheduler around the alert core
//!
//! One pass: snapshot the metals that have watches, fetch each price with
//! no lock held, evaluate every watch under the state lock, then deliver
//! the alerts. Delivery failures are logged; watch state is already
//! committed so a failed message is never re-sent as a duplicate alert.

pub mod service;

pub use service::TrackerService;

use crate::alerts::{format_alert, Alert, WatchRegistry};
use crate::errors::{AlertError, PriceError};
use crate::logger::{self, LogTag};
use crate::notifications::Transport;
use crate::pricing::{Metal, PriceSource};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Last successful quote for a metal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub price: f64,
    pub at_millis: i64,
}

/// Everything commands and the scheduler share
#[derive(Debug)]
pub struct TrackerState {
    pub registry: WatchRegistry,
    pub enabled: bool,
    pub last_quotes: HashMap<Metal, Quote>,
    pub last_tick_at: Option<i64>,
    pub last_error: Option<String>,
}

impl TrackerState {
    pub fn new(registry: WatchRegistry, enabled: bool) -> Self {
        Self {
            registry,
            enabled,
            last_quotes: HashMap::new(),
            last_tick_at: None,
            last_error: None,
        }
    }

    fn record_quote(&mut self, metal: Metal, price: f64, at_millis: i64) {
        self.last_quotes.insert(metal, Quote { price, at_millis });
    }
}

/// Outcome of one evaluation pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Tracking was off or nothing was being watched
    pub skipped: bool,
    pub fetched: usize,
    pub fetch_errors: usize,
    pub alerts: usize,
    pub delivered: usize,
    pub delivery_failures: usize,
}

pub struct Tracker {
    state: Arc<Mutex<TrackerState>>,
    source: Arc<dyn PriceSource>,
    transport: Arc<dyn Transport>,
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl Tracker {
    pub fn new(
        registry: WatchRegistry,
        source: Arc<dyn PriceSource>,
        transport: Arc<dyn Transport>,
        enabled: bool,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(TrackerState::new(registry, enabled))),
            source,
            transport,
        }
    }

    /// Shared state handle; hold the guard only for in-memory work
    pub fn state(&self) -> Arc<Mutex<TrackerState>> {
        self.state.clone()
    }

    pub fn source_name(&self) -> String {
        self.source.name().to_string()
    }

    pub async fn is_enabled(&self) -> bool {
        self.state.lock().await.enabled
    }

    /// Switch tracking on or off; returns the previous value.
    ///
    /// Turning tracking back on starts a new session: every watch takes a
    /// fresh baseline so a move that happened while off never alerts.
    pub async fn set_enabled(&self, enabled: bool) -> bool {
        let mut state = self.state.lock().await;
        let previous = state.enabled;
        if enabled && !previous {
            state.registry.rebaseline(None);
        }
        state.enabled = enabled;
        drop(state);

        if previous != enabled {
            logger::info(
                LogTag::Tracker,
                &format!("Tracking {}", if enabled { "enabled" } else { "disabled" }),
            );
        }
        previous
    }

    /// Fetch a price right now for display; watches are not evaluated
    pub async fn quote(&self, metal: Metal) -> Result<f64, PriceError> {
        let price = self.source.fetch(metal).await?;
        self.state.lock().await.record_quote(metal, price, now_millis());
        Ok(price)
    }

    /// Run one evaluation pass at `now_ms`
    pub async fn tick(&self, now_ms: i64) -> TickReport {
        let mut report = TickReport::default();

        let metals: Vec<Metal> = {
            let mut state = self.state.lock().await;
            state.last_tick_at = Some(now_ms);
            if !state.enabled {
                report.skipped = true;
                return report;
            }
            state.registry.metals().into_iter().collect()
        };

        if metals.is_empty() {
            report.skipped = true;
            return report;
        }

        // Network first, without the lock
        let mut quotes = Vec::with_capacity(metals.len());
        for metal in metals {
            match self.source.fetch(metal).await {
                Ok(price) => {
                    report.fetched += 1;
                    quotes.push((metal, price));
                }
                Err(e) => {
                    report.fetch_errors += 1;
                    logger::warning(
                        LogTag::Price,
                        &format!("Skipping {} this tick: {}", metal.as_str(), e),
                    );
                    self.state.lock().await.last_error = Some(e.to_string());
                }
            }
        }

        let alerts = self.evaluate(quotes, report.fetch_errors == 0, now_ms).await;
        report.alerts = alerts.len();

        for alert in &alerts {
            match self.transport.send(alert.chat_id, &format_alert(alert)).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.delivery_failures += 1;
                    logger::error(LogTag::Alerts, &format!("Alert not delivered: {}", e));
                }
            }
        }

        logger::debug(LogTag::Tracker, &format!("Tick finished: {:?}", report));
        report
    }

    async fn evaluate(&self, quotes: Vec<(Metal, f64)>, fetches_ok: bool, now_ms: i64) -> Vec<Alert> {
        let mut state = self.state.lock().await;
        if fetches_ok {
            state.last_error = None;
        }

        // Disabled while fetching: drop the samples
        if !state.enabled {
            return Vec::new();
        }

        let mut alerts = Vec::new();
        for (metal, price) in quotes {
            match state.registry.evaluate_all(metal, price, now_ms) {
                Ok(fired) => {
                    state.record_quote(metal, price, now_ms);
                    for alert in &fired {
                        logger::info(
                            LogTag::Alerts,
                            &format!(
                                "{} crossed {} {} at {} (chat {})",
                                alert.metal.as_str(),
                                alert.direction,
                                alert.threshold,
                                alert.price,
                                alert.chat_id
                            ),
                        );
                    }
                    alerts.extend(fired);
                }
                Err(AlertError::InvalidSample { price }) => {
                    logger::warning(
                        LogTag::Alerts,
                        &format!("Ignoring invalid {} sample: {}", metal.as_str(), price),
                    );
                }
                Err(e) => logger::error(LogTag::Alerts, &e.to_string()),
            }
        }
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{Direction, Persistence};
    use crate::test_support::{FakePriceSource, RecordingTransport};

    const OWNER: i64 = 42;

    fn setup(enabled: bool) -> (Tracker, Arc<FakePriceSource>, Arc<RecordingTransport>) {
        let source = Arc::new(FakePriceSource::new());
        let transport = Arc::new(RecordingTransport::new());
        let tracker = Tracker::new(WatchRegistry::new(), source.clone(), transport.clone(), enabled);
        (tracker, source, transport)
    }

    async fn watch(tracker: &Tracker, metal: Metal, direction: Direction, threshold: f64, persistence: Persistence) {
        let state = tracker.state();
        let mut state = state.lock().await;
        state
            .registry
            .upsert(OWNER, metal, direction, threshold, persistence)
            .unwrap();
    }

    #[tokio::test]
    async fn test_disabled_tracker_does_not_fetch() {
        let (tracker, source, _) = setup(false);
        watch(&tracker, Metal::Silver, Direction::Above, 30.0, Persistence::Persistent).await;

        let report = tracker.tick(0).await;
        assert!(report.skipped);
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_watches_no_fetch() {
        let (tracker, source, _) = setup(true);
        assert!(tracker.tick(0).await.skipped);
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_persistent_scenario_end_to_end() {
        let (tracker, source, transport) = setup(true);
        watch(&tracker, Metal::Silver, Direction::Above, 30.0, Persistence::Persistent).await;
        source.push_prices(Metal::Silver, &[29.0, 30.5, 30.8, 29.5, 30.2]);

        let times = [0, 1_000, 30_000, 60_000, 90_000];
        let fired: Vec<usize> = {
            let mut v = Vec::new();
            for t in times {
                v.push(tracker.tick(t).await.alerts);
            }
            v
        };
        assert_eq!(fired, vec![0, 1, 0, 0, 1]);

        let messages = transport.messages_for(OWNER);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("SILVER ALERT"));
        assert!(messages[1].contains("30.20"));

        let state = tracker.state();
        let state = state.lock().await;
        assert_eq!(state.last_quotes[&Metal::Silver], Quote { price: 30.2, at_millis: 90_000 });
    }

    #[tokio::test]
    async fn test_one_shot_removed_after_delivery() {
        let (tracker, source, transport) = setup(true);
        watch(&tracker, Metal::Silver, Direction::Below, 23.0, Persistence::OneShot).await;
        source.push_prices(Metal::Silver, &[24.10, 23.50, 22.90, 22.50]);

        for t in 0..4 {
            tracker.tick(t * 60_000).await;
        }

        assert_eq!(transport.messages_for(OWNER).len(), 1);
        assert!(tracker.state().lock().await.registry.is_empty());
        // Registry empty: the last tick skipped the fetch entirely
        assert_eq!(source.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fetch_error_skips_tick_without_mutation() {
        let (tracker, source, transport) = setup(true);
        watch(&tracker, Metal::Silver, Direction::Above, 30.0, Persistence::Persistent).await;
        source.push(Metal::Silver, Ok(29.0));
        source.push(Metal::Silver, Err(PriceError::upstream("fake", "HTTP 503")));
        source.push(Metal::Silver, Ok(31.0));

        tracker.tick(0).await;
        let report = tracker.tick(1_000).await;
        assert_eq!(report.fetch_errors, 1);
        assert_eq!(report.alerts, 0);
        assert!(tracker.state().lock().await.last_error.is_some());

        // The baseline from t=0 survived the failed tick
        assert_eq!(tracker.tick(2_000).await.alerts, 1);
        assert_eq!(transport.messages_for(OWNER).len(), 1);
    }

    #[tokio::test]
    async fn test_recovered_fetch_clears_last_error() {
        let (tracker, source, _) = setup(true);
        watch(&tracker, Metal::Silver, Direction::Above, 30.0, Persistence::Persistent).await;
        source.push(Metal::Silver, Ok(29.0));
        source.push(Metal::Silver, Err(PriceError::upstream("fake", "HTTP 503")));
        source.push_prices(Metal::Silver, &[29.1, 29.2]);

        tracker.tick(0).await;
        tracker.tick(1_000).await;
        assert!(tracker.state().lock().await.last_error.is_some());

        tracker.tick(2_000).await;
        assert!(tracker.state().lock().await.last_error.is_none());
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_last_error() {
        let (tracker, source, _) = setup(true);
        watch(&tracker, Metal::Silver, Direction::Above, 30.0, Persistence::Persistent).await;
        watch(&tracker, Metal::Gold, Direction::Below, 2000.0, Persistence::Persistent).await;
        source.push(Metal::Silver, Ok(29.0));
        source.push(Metal::Gold, Err(PriceError::upstream("fake", "timeout")));

        tracker.tick(0).await;
        assert!(tracker.state().lock().await.last_error.is_some());
    }

    #[tokio::test]
    async fn test_delivery_failure_is_not_retried() {
        let (tracker, source, transport) = setup(true);
        transport.fail_for(OWNER);
        watch(&tracker, Metal::Silver, Direction::Above, 30.0, Persistence::Persistent).await;
        source.push_prices(Metal::Silver, &[29.0, 31.0, 31.5]);

        tracker.tick(0).await;
        let report = tracker.tick(1_000).await;
        assert_eq!(report.alerts, 1);
        assert_eq!(report.delivery_failures, 1);

        let report = tracker.tick(2_000).await;
        assert_eq!(report.alerts, 0);
    }

    #[tokio::test]
    async fn test_metals_are_fetched_independently() {
        let (tracker, source, transport) = setup(true);
        watch(&tracker, Metal::Silver, Direction::Above, 30.0, Persistence::Persistent).await;
        watch(&tracker, Metal::Gold, Direction::Below, 2000.0, Persistence::Persistent).await;
        source.push_prices(Metal::Silver, &[29.0, 31.0]);
        source.push(Metal::Gold, Ok(2100.0));
        source.push(Metal::Gold, Err(PriceError::upstream("fake", "timeout")));

        tracker.tick(0).await;
        let report = tracker.tick(1_000).await;
        assert_eq!(report.fetched, 1);
        assert_eq!(report.fetch_errors, 1);
        assert_eq!(report.alerts, 1);
        assert!(transport.last_for(OWNER).unwrap().contains("SILVER"));
    }

    #[tokio::test]
    async fn test_reenable_rebaselines() {
        let (tracker, source, transport) = setup(true);
        watch(&tracker, Metal::Silver, Direction::Above, 30.0, Persistence::Persistent).await;
        source.push_prices(Metal::Silver, &[29.0, 31.0]);

        tracker.tick(0).await;
        assert!(tracker.set_enabled(false).await);
        assert!(!tracker.set_enabled(true).await);

        // 31.0 after re-enable is a new baseline, not a crossing
        assert_eq!(tracker.tick(1_000).await.alerts, 0);
        assert!(transport.messages().is_empty());
    }

    #[tokio::test]
    async fn test_quote_records_last_price() {
        let (tracker, source, _) = setup(false);
        source.push(Metal::Gold, Ok(2400.5));
        assert_eq!(tracker.quote(Metal::Gold).await, Ok(2400.5));
        assert_eq!(
            tracker.state().lock().await.last_quotes.get(&Metal::Gold).map(|q| q.price),
            Some(2400.5)
        );
    }
}
