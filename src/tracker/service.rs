use super::{now_millis, Tracker};
use crate::logger::{self, LogTag};
use crate::services::{Service, ServiceHealth};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Fixed-interval scheduler driving `Tracker::tick`.
///
/// A single task owns the interval, so ticks never overlap; a tick that
/// overruns the period causes the missed ticks to be skipped.
pub struct TrackerService {
    tracker: Arc<Tracker>,
    interval: Duration,
}

impl TrackerService {
    pub fn new(tracker: Arc<Tracker>, interval: Duration) -> Self {
        Self {
            tracker,
            interval: interval.max(Duration::from_secs(1)),
        }
    }
}

async fn run_loop(tracker: Arc<Tracker>, period: Duration, shutdown: Arc<Notify>) {
    let shutdown_signal = shutdown.notified();
    tokio::pin!(shutdown_signal);

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut shutdown_signal => {
                logger::info(LogTag::Tracker, "Tracker loop stopping");
                break;
            }
            _ = ticker.tick() => {
                tracker.tick(now_millis()).await;
            }
        }
    }
}

#[async_trait]
impl Service for TrackerService {
    fn name(&self) -> &'static str {
        "tracker"
    }

    fn priority(&self) -> i32 {
        10
    }

    async fn initialize(&mut self) -> Result<(), String> {
        let state = self.tracker.state();
        let state = state.lock().await;
        logger::info(
            LogTag::Tracker,
            &format!(
                "Checking every {}s via {} (tracking {}, {} watches)",
                self.interval.as_secs(),
                self.tracker.source_name(),
                if state.enabled { "on" } else { "off" },
                state.registry.len()
            ),
        );
        Ok(())
    }

    async fn start(&mut self, shutdown: Arc<Notify>) -> Result<Vec<JoinHandle<()>>, String> {
        let handle = tokio::spawn(run_loop(self.tracker.clone(), self.interval, shutdown));
        Ok(vec![handle])
    }

    async fn health(&self) -> ServiceHealth {
        let state = self.tracker.state();
        let state = state.lock().await;
        if !state.enabled {
            return ServiceHealth::Healthy;
        }

        // Two missed periods without a tick means the loop is stuck
        let stale_after = (self.interval.as_millis() as i64) * 2;
        match (state.last_tick_at, &state.last_error) {
            (Some(at), _) if now_millis() - at > stale_after => {
                ServiceHealth::Degraded(format!("no tick for {}s", (now_millis() - at) / 1000))
            }
            (_, Some(err)) => ServiceHealth::Degraded(format!("last price error: {}", err)),
            _ => ServiceHealth::Healthy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{Direction, Persistence, WatchRegistry};
    use crate::errors::PriceError;
    use crate::pricing::Metal;
    use crate::test_support::{FakePriceSource, RecordingTransport};

    #[tokio::test(start_paused = true)]
    async fn test_loop_ticks_and_stops_on_shutdown() {
        let source = Arc::new(FakePriceSource::new());
        source.push_prices(Metal::Silver, &[29.0, 31.0]);
        let transport = Arc::new(RecordingTransport::new());

        let mut registry = WatchRegistry::new();
        registry
            .upsert(7, Metal::Silver, Direction::Above, 30.0, Persistence::Persistent)
            .unwrap();
        let tracker = Arc::new(Tracker::new(registry, source.clone(), transport.clone(), true));

        let mut service = TrackerService::new(tracker, Duration::from_secs(60));
        let shutdown = Arc::new(Notify::new());
        let handles = service.start(shutdown.clone()).await.unwrap();

        // First tick fires immediately, the second one period later
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(source.call_count(), 2);
        assert_eq!(transport.messages_for(7).len(), 1);

        shutdown.notify_waiters();
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_health_when_disabled() {
        let tracker = Arc::new(Tracker::new(
            WatchRegistry::new(),
            Arc::new(FakePriceSource::new()),
            Arc::new(RecordingTransport::new()),
            false,
        ));
        let service = TrackerService::new(tracker, Duration::from_secs(60));
        assert_eq!(service.health().await, ServiceHealth::Healthy);
    }

    #[tokio::test]
    async fn test_health_recovers_after_fetch_error() {
        let source = Arc::new(FakePriceSource::new());
        source.push(Metal::Silver, Ok(29.0));
        source.push(Metal::Silver, Err(PriceError::upstream("fake", "HTTP 503")));
        source.push_prices(Metal::Silver, &[29.1, 29.2, 29.3]);

        let mut registry = WatchRegistry::new();
        registry
            .upsert(7, Metal::Silver, Direction::Above, 30.0, Persistence::Persistent)
            .unwrap();
        let tracker = Arc::new(Tracker::new(
            registry,
            source,
            Arc::new(RecordingTransport::new()),
            true,
        ));
        let service = TrackerService::new(tracker.clone(), Duration::from_secs(60));

        tracker.tick(now_millis()).await;
        tracker.tick(now_millis()).await;
        assert!(service.health().await.is_degraded());

        for _ in 0..3 {
            tracker.tick(now_millis()).await;
        }
        assert_eq!(service.health().await, ServiceHealth::Healthy);
    }
}
