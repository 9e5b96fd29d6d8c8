//! Threshold watch: edge-triggered crossing detection for one chat, metal
//! and direction.
//!
//! A watch only alerts on the evaluation where the observed side changes
//! *into* its direction. The first sample after creation (or after
//! [`ThresholdWatch::rebaseline`]) only records the side. Persistent watches
//! additionally swallow crossings that land inside the cooldown window;
//! the side is still updated so the next real crossing is seen.

use super::types::{Alert, AlertDecision, Direction, Persistence, Quiet, Side, WatchKey, COOLDOWN_MS};
use crate::errors::AlertError;
use crate::pricing::Metal;

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdWatch {
    key: WatchKey,
    threshold: f64,
    persistence: Persistence,
    cooldown_ms: i64,
    last_side: Side,
    last_alert_at: Option<i64>,
    spent: bool,
}

impl ThresholdWatch {
    /// Create a watch; non-finite thresholds are rejected
    pub fn new(
        chat_id: i64,
        metal: Metal,
        direction: Direction,
        threshold: f64,
        persistence: Persistence,
    ) -> Result<Self, AlertError> {
        if !threshold.is_finite() {
            return Err(AlertError::InvalidThreshold { value: threshold });
        }

        Ok(Self {
            key: WatchKey::new(chat_id, metal, direction),
            threshold,
            persistence,
            cooldown_ms: COOLDOWN_MS,
            last_side: Side::Unknown,
            last_alert_at: None,
            spent: false,
        })
    }

    /// Override the persistent-watch cooldown (negative values clamp to 0)
    pub fn with_cooldown_ms(mut self, cooldown_ms: i64) -> Self {
        self.cooldown_ms = cooldown_ms.max(0);
        self
    }

    pub fn key(&self) -> WatchKey {
        self.key
    }

    pub fn chat_id(&self) -> i64 {
        self.key.chat_id
    }

    pub fn metal(&self) -> Metal {
        self.key.metal
    }

    pub fn direction(&self) -> Direction {
        self.key.direction
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn persistence(&self) -> Persistence {
        self.persistence
    }

    pub fn last_side(&self) -> Side {
        self.last_side
    }

    pub fn last_alert_at(&self) -> Option<i64> {
        self.last_alert_at
    }

    /// One-shot watch that already fired and waits for removal
    pub fn is_spent(&self) -> bool {
        self.spent
    }

    /// Forget the observed side; the next sample becomes a new baseline
    pub fn rebaseline(&mut self) {
        self.last_side = Side::Unknown;
    }

    fn in_cooldown(&self, now_ms: i64) -> bool {
        match (self.persistence, self.last_alert_at) {
            (Persistence::Persistent, Some(at)) => now_ms - at < self.cooldown_ms,
            _ => false,
        }
    }

    /// Feed one price sample observed at `now_ms`
    pub fn evaluate(&mut self, price: f64, now_ms: i64) -> Result<AlertDecision, AlertError> {
        if !price.is_finite() {
            return Err(AlertError::InvalidSample { price });
        }

        if self.spent {
            return Ok(AlertDecision::NoAlert(Quiet::Spent));
        }

        let current = Side::classify(price, self.threshold);
        let previous = std::mem::replace(&mut self.last_side, current);

        if previous == Side::Unknown {
            return Ok(AlertDecision::NoAlert(Quiet::Baseline));
        }

        let crossed_into_target = current != previous && current.is_target(self.key.direction);
        if !crossed_into_target {
            return Ok(AlertDecision::NoAlert(Quiet::NoCrossing));
        }

        if self.in_cooldown(now_ms) {
            return Ok(AlertDecision::NoAlert(Quiet::Cooldown));
        }

        self.last_alert_at = Some(now_ms);
        if self.persistence == Persistence::OneShot {
            self.spent = true;
        }

        Ok(AlertDecision::Alert(Alert {
            chat_id: self.key.chat_id,
            metal: self.key.metal,
            direction: self.key.direction,
            threshold: self.threshold,
            price,
            at_millis: now_ms,
            persistence: self.persistence,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT: i64 = 42;

    fn watch(direction: Direction, threshold: f64, persistence: Persistence) -> ThresholdWatch {
        ThresholdWatch::new(CHAT, Metal::Silver, direction, threshold, persistence).unwrap()
    }

    fn fired(decision: Result<AlertDecision, AlertError>) -> bool {
        decision.unwrap().is_alert()
    }

    #[test]
    fn test_rejects_non_finite_threshold() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = ThresholdWatch::new(CHAT, Metal::Gold, Direction::Above, bad, Persistence::OneShot);
            assert!(matches!(result, Err(AlertError::InvalidThreshold { .. })));
        }
    }

    #[test]
    fn test_first_sample_is_baseline_even_past_threshold() {
        let mut w = watch(Direction::Above, 25.0, Persistence::Persistent);
        let decision = w.evaluate(40.0, 0).unwrap();
        assert_eq!(decision, AlertDecision::NoAlert(Quiet::Baseline));
        assert_eq!(w.last_side(), Side::Above);
        assert_eq!(w.last_alert_at(), None);
    }

    #[test]
    fn test_tie_counts_as_above() {
        let mut w = watch(Direction::Above, 25.0, Persistence::Persistent);
        assert!(!fired(w.evaluate(24.0, 0)));
        let decision = w.evaluate(25.0, 1_000).unwrap();
        match decision {
            AlertDecision::Alert(alert) => {
                assert_eq!(alert.price, 25.0);
                assert_eq!(alert.threshold, 25.0);
                assert_eq!(alert.direction, Direction::Above);
            }
            other => panic!("expected alert, got {:?}", other),
        }
    }

    #[test]
    fn test_tie_does_not_count_as_below_crossing() {
        let mut w = watch(Direction::Below, 25.0, Persistence::Persistent);
        assert!(!fired(w.evaluate(26.0, 0)));
        assert!(!fired(w.evaluate(25.0, 1_000)));
        assert!(fired(w.evaluate(24.99, 2_000)));
    }

    #[test]
    fn test_crossing_away_from_direction_never_alerts() {
        let mut w = watch(Direction::Below, 23.0, Persistence::Persistent);
        assert!(!fired(w.evaluate(22.0, 0)));
        let decision = w.evaluate(24.0, 1_000).unwrap();
        assert_eq!(decision, AlertDecision::NoAlert(Quiet::NoCrossing));
        assert_eq!(w.last_side(), Side::Above);
    }

    #[test]
    fn test_staying_on_target_side_does_not_repeat() {
        let mut w = watch(Direction::Above, 30.0, Persistence::Persistent);
        w.evaluate(29.0, 0).unwrap();
        assert!(fired(w.evaluate(30.5, 1_000)));
        for (i, price) in [30.8, 31.0, 35.0].iter().enumerate() {
            let decision = w.evaluate(*price, 200_000 + i as i64).unwrap();
            assert_eq!(decision, AlertDecision::NoAlert(Quiet::NoCrossing));
        }
    }

    #[test]
    fn test_invalid_sample_does_not_mutate() {
        let mut w = watch(Direction::Above, 30.0, Persistence::Persistent);
        w.evaluate(29.0, 0).unwrap();
        w.evaluate(31.0, 1_000).unwrap();
        let before = w.clone();

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = w.evaluate(bad, 5_000);
            assert!(matches!(result, Err(AlertError::InvalidSample { .. })));
        }
        assert_eq!(w, before);
    }

    #[test]
    fn test_invalid_first_sample_keeps_unknown_side() {
        let mut w = watch(Direction::Below, 23.0, Persistence::OneShot);
        assert!(w.evaluate(f64::NAN, 0).is_err());
        assert_eq!(w.last_side(), Side::Unknown);
        assert_eq!(w.evaluate(22.0, 1).unwrap(), AlertDecision::NoAlert(Quiet::Baseline));
    }

    #[test]
    fn test_one_shot_below_scenario() {
        let mut w = watch(Direction::Below, 23.0, Persistence::OneShot);
        assert_eq!(w.evaluate(24.10, 0).unwrap(), AlertDecision::NoAlert(Quiet::Baseline));
        assert_eq!(w.evaluate(23.50, 60_000).unwrap(), AlertDecision::NoAlert(Quiet::NoCrossing));

        let alert = w.evaluate(22.90, 120_000).unwrap().into_alert().expect("alert");
        assert_eq!(alert.price, 22.90);
        assert_eq!(alert.persistence, Persistence::OneShot);
        assert!(w.is_spent());

        // Back above and down again: a spent watch stays quiet
        w.evaluate(24.0, 180_000).unwrap();
        assert_eq!(w.evaluate(22.5, 240_000).unwrap(), AlertDecision::NoAlert(Quiet::Spent));
    }

    #[test]
    fn test_persistent_cooldown_scenario() {
        let mut w = watch(Direction::Above, 30.0, Persistence::Persistent);
        assert_eq!(w.evaluate(29.00, 0).unwrap(), AlertDecision::NoAlert(Quiet::Baseline));

        assert!(fired(w.evaluate(30.50, 1_000)));
        assert_eq!(w.last_alert_at(), Some(1_000));

        assert_eq!(w.evaluate(30.80, 30_000).unwrap(), AlertDecision::NoAlert(Quiet::NoCrossing));

        w.evaluate(29.50, 60_000).unwrap();
        let alert = w.evaluate(30.20, 90_000).unwrap().into_alert().expect("second alert");
        assert_eq!(alert.at_millis, 90_000);
        assert_eq!(w.last_alert_at(), Some(90_000));
    }

    #[test]
    fn test_two_crossings_inside_cooldown_alert_once() {
        let mut w = watch(Direction::Above, 30.0, Persistence::Persistent);
        w.evaluate(29.0, 0).unwrap();
        assert!(fired(w.evaluate(30.1, 1_000)));
        w.evaluate(29.9, 2_000).unwrap();

        let decision = w.evaluate(30.1, 3_000).unwrap();
        assert_eq!(decision, AlertDecision::NoAlert(Quiet::Cooldown));
        // Side still tracks the market during cooldown
        assert_eq!(w.last_side(), Side::Above);
        assert_eq!(w.last_alert_at(), Some(1_000));

        // Still above: no edge, even after the cooldown expired
        assert!(!fired(w.evaluate(30.2, 200_000)));
        w.evaluate(29.0, 201_000).unwrap();
        assert!(fired(w.evaluate(30.0, 202_000)));
    }

    #[test]
    fn test_cooldown_boundary_is_exclusive() {
        let mut w = watch(Direction::Below, 10.0, Persistence::Persistent).with_cooldown_ms(5_000);
        w.evaluate(11.0, 0).unwrap();
        assert!(fired(w.evaluate(9.0, 1_000)));
        w.evaluate(11.0, 2_000).unwrap();
        // exactly cooldown_ms after the last alert: allowed
        assert!(fired(w.evaluate(9.0, 6_000)));
    }

    #[test]
    fn test_one_shot_ignores_cooldown() {
        let mut w = watch(Direction::Above, 1.0, Persistence::OneShot).with_cooldown_ms(i64::MAX);
        w.evaluate(0.5, 0).unwrap();
        assert!(fired(w.evaluate(1.5, 1)));
    }

    #[test]
    fn test_rebaseline_suppresses_next_sample() {
        let mut w = watch(Direction::Above, 30.0, Persistence::Persistent);
        w.evaluate(29.0, 0).unwrap();
        w.rebaseline();
        assert_eq!(w.last_side(), Side::Unknown);
        assert_eq!(w.evaluate(31.0, 1_000).unwrap(), AlertDecision::NoAlert(Quiet::Baseline));
    }
}
