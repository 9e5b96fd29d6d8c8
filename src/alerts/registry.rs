/// Keyed collection of threshold watches
///
/// Owned by the tracker; never a global. Key uniqueness is enforced by
/// `WatchKey`, so a second watch for the same chat, metal and direction
/// replaces the first.
use super::types::{Alert, AlertDecision, Direction, Persistence, WatchKey, COOLDOWN_MS};
use super::watch::ThresholdWatch;
use crate::errors::AlertError;
use crate::pricing::Metal;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone)]
pub struct WatchRegistry {
    watches: HashMap<WatchKey, ThresholdWatch>,
    cooldown_ms: i64,
}

impl Default for WatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::with_cooldown_ms(COOLDOWN_MS)
    }

    /// Registry whose persistent watches use a custom cooldown
    pub fn with_cooldown_ms(cooldown_ms: i64) -> Self {
        Self {
            watches: HashMap::new(),
            cooldown_ms,
        }
    }

    pub fn cooldown_ms(&self) -> i64 {
        self.cooldown_ms
    }

    /// Create or replace the watch for `(chat_id, metal, direction)`.
    ///
    /// Returns the replaced watch, if any. The new watch always starts
    /// with an unknown side.
    pub fn upsert(
        &mut self,
        chat_id: i64,
        metal: Metal,
        direction: Direction,
        threshold: f64,
        persistence: Persistence,
    ) -> Result<Option<ThresholdWatch>, AlertError> {
        let watch = ThresholdWatch::new(chat_id, metal, direction, threshold, persistence)?
            .with_cooldown_ms(self.cooldown_ms);
        Ok(self.watches.insert(watch.key(), watch))
    }

    /// Remove watches of a chat, narrowed by metal and/or direction.
    /// Returns how many were removed.
    pub fn remove(&mut self, chat_id: i64, metal: Option<Metal>, direction: Option<Direction>) -> usize {
        let before = self.watches.len();
        self.watches.retain(|key, _| {
            let matches = key.chat_id == chat_id
                && metal.map_or(true, |m| key.metal == m)
                && direction.map_or(true, |d| key.direction == d);
            !matches
        });
        before - self.watches.len()
    }

    pub fn get(&self, key: &WatchKey) -> Option<&ThresholdWatch> {
        self.watches.get(key)
    }

    /// Snapshot of a chat's watches ordered by metal then direction
    pub fn list_for_chat(&self, chat_id: i64) -> Vec<ThresholdWatch> {
        let mut list: Vec<ThresholdWatch> = self
            .watches
            .values()
            .filter(|w| w.chat_id() == chat_id)
            .cloned()
            .collect();
        list.sort_by_key(|w| w.key());
        list
    }

    /// Metals with at least one active watch
    pub fn metals(&self) -> BTreeSet<Metal> {
        self.watches.keys().map(|k| k.metal).collect()
    }

    /// Feed one price to every watch on `metal`.
    ///
    /// Fired one-shot watches are dropped before returning. An invalid
    /// price is rejected before any watch is touched.
    pub fn evaluate_all(&mut self, metal: Metal, price: f64, now_ms: i64) -> Result<Vec<Alert>, AlertError> {
        if !price.is_finite() {
            return Err(AlertError::InvalidSample { price });
        }

        let mut alerts = Vec::new();
        for watch in self.watches.values_mut().filter(|w| w.metal() == metal) {
            if let AlertDecision::Alert(alert) = watch.evaluate(price, now_ms)? {
                alerts.push(alert);
            }
        }

        self.watches.retain(|_, w| !w.is_spent());
        alerts.sort_by_key(|a| (a.chat_id, a.direction));
        Ok(alerts)
    }

    /// Reset every watch of the chat (or all chats) to an unknown side
    pub fn rebaseline(&mut self, chat_id: Option<i64>) {
        for watch in self.watches.values_mut() {
            if chat_id.map_or(true, |c| watch.chat_id() == c) {
                watch.rebaseline();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::types::Side;

    const OWNER: i64 = 1001;

    #[test]
    fn test_upsert_replaces_same_key() {
        let mut reg = WatchRegistry::new();
        assert!(reg
            .upsert(OWNER, Metal::Silver, Direction::Above, 25.0, Persistence::Persistent)
            .unwrap()
            .is_none());

        let old = reg
            .upsert(OWNER, Metal::Silver, Direction::Above, 27.0, Persistence::OneShot)
            .unwrap()
            .expect("previous watch");
        assert_eq!(old.threshold(), 25.0);
        assert_eq!(reg.len(), 1);

        let key = WatchKey::new(OWNER, Metal::Silver, Direction::Above);
        let current = reg.get(&key).unwrap();
        assert_eq!(current.threshold(), 27.0);
        assert_eq!(current.persistence(), Persistence::OneShot);
    }

    #[test]
    fn test_upsert_resets_side() {
        let mut reg = WatchRegistry::new();
        reg.upsert(OWNER, Metal::Silver, Direction::Above, 25.0, Persistence::Persistent)
            .unwrap();
        reg.evaluate_all(Metal::Silver, 24.0, 0).unwrap();

        reg.upsert(OWNER, Metal::Silver, Direction::Above, 25.5, Persistence::Persistent)
            .unwrap();
        // A reconfigured watch baselines again instead of firing
        assert!(reg.evaluate_all(Metal::Silver, 26.0, 1_000).unwrap().is_empty());
        let key = WatchKey::new(OWNER, Metal::Silver, Direction::Above);
        assert_eq!(reg.get(&key).unwrap().last_side(), Side::Above);
    }

    #[test]
    fn test_upsert_rejects_non_finite_threshold() {
        let mut reg = WatchRegistry::new();
        let result = reg.upsert(OWNER, Metal::Gold, Direction::Below, f64::NAN, Persistence::OneShot);
        assert!(matches!(result, Err(AlertError::InvalidThreshold { .. })));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_both_directions_are_independent() {
        let mut reg = WatchRegistry::new();
        reg.upsert(OWNER, Metal::Silver, Direction::Above, 30.0, Persistence::Persistent)
            .unwrap();
        reg.upsert(OWNER, Metal::Silver, Direction::Below, 20.0, Persistence::Persistent)
            .unwrap();
        assert_eq!(reg.len(), 2);

        reg.evaluate_all(Metal::Silver, 25.0, 0).unwrap();
        let alerts = reg.evaluate_all(Metal::Silver, 31.0, 1_000).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].direction, Direction::Above);

        let alerts = reg.evaluate_all(Metal::Silver, 19.0, 2_000).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].direction, Direction::Below);
    }

    #[test]
    fn test_remove_variants() {
        let mut reg = WatchRegistry::new();
        for metal in [Metal::Silver, Metal::Gold] {
            for dir in [Direction::Above, Direction::Below] {
                reg.upsert(OWNER, metal, dir, 10.0, Persistence::Persistent).unwrap();
            }
        }
        reg.upsert(7, Metal::Silver, Direction::Above, 10.0, Persistence::Persistent)
            .unwrap();

        assert_eq!(reg.remove(OWNER, Some(Metal::Silver), Some(Direction::Above)), 1);
        assert_eq!(reg.remove(OWNER, None, Some(Direction::Below)), 2);
        assert_eq!(reg.remove(OWNER, None, None), 1);
        assert_eq!(reg.remove(OWNER, None, None), 0);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.list_for_chat(7).len(), 1);
    }

    #[test]
    fn test_list_for_chat_is_sorted_snapshot() {
        let mut reg = WatchRegistry::new();
        reg.upsert(OWNER, Metal::Silver, Direction::Below, 20.0, Persistence::OneShot)
            .unwrap();
        reg.upsert(OWNER, Metal::Gold, Direction::Above, 2500.0, Persistence::Persistent)
            .unwrap();
        reg.upsert(OWNER, Metal::Silver, Direction::Above, 30.0, Persistence::Persistent)
            .unwrap();

        let list = reg.list_for_chat(OWNER);
        let keys: Vec<(Metal, Direction)> = list.iter().map(|w| (w.metal(), w.direction())).collect();
        assert_eq!(
            keys,
            vec![
                (Metal::Gold, Direction::Above),
                (Metal::Silver, Direction::Above),
                (Metal::Silver, Direction::Below),
            ]
        );
        assert!(reg.list_for_chat(99).is_empty());
    }

    #[test]
    fn test_evaluate_all_only_touches_that_metal() {
        let mut reg = WatchRegistry::new();
        reg.upsert(OWNER, Metal::Silver, Direction::Above, 30.0, Persistence::Persistent)
            .unwrap();
        reg.upsert(OWNER, Metal::Gold, Direction::Above, 2000.0, Persistence::Persistent)
            .unwrap();

        reg.evaluate_all(Metal::Silver, 29.0, 0).unwrap();
        let gold_key = WatchKey::new(OWNER, Metal::Gold, Direction::Above);
        assert_eq!(reg.get(&gold_key).unwrap().last_side(), Side::Unknown);
        assert_eq!(reg.metals().into_iter().collect::<Vec<_>>(), vec![Metal::Gold, Metal::Silver]);
    }

    #[test]
    fn test_one_shot_removed_after_firing() {
        let mut reg = WatchRegistry::new();
        reg.upsert(OWNER, Metal::Silver, Direction::Below, 23.0, Persistence::OneShot)
            .unwrap();

        assert!(reg.evaluate_all(Metal::Silver, 24.10, 0).unwrap().is_empty());
        assert!(reg.evaluate_all(Metal::Silver, 23.50, 60_000).unwrap().is_empty());

        let alerts = reg.evaluate_all(Metal::Silver, 22.90, 120_000).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].threshold, 23.0);
        assert!(reg.is_empty());

        assert!(reg.evaluate_all(Metal::Silver, 22.50, 180_000).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_price_touches_nothing() {
        let mut reg = WatchRegistry::new();
        reg.upsert(OWNER, Metal::Silver, Direction::Below, 23.0, Persistence::OneShot)
            .unwrap();

        let result = reg.evaluate_all(Metal::Silver, f64::INFINITY, 0);
        assert!(matches!(result, Err(AlertError::InvalidSample { .. })));
        let key = WatchKey::new(OWNER, Metal::Silver, Direction::Below);
        assert_eq!(reg.get(&key).unwrap().last_side(), Side::Unknown);
    }

    #[test]
    fn test_custom_cooldown_applies_to_new_watches() {
        let mut reg = WatchRegistry::with_cooldown_ms(0);
        reg.upsert(OWNER, Metal::Silver, Direction::Above, 30.0, Persistence::Persistent)
            .unwrap();
        reg.evaluate_all(Metal::Silver, 29.0, 0).unwrap();
        assert_eq!(reg.evaluate_all(Metal::Silver, 31.0, 1).unwrap().len(), 1);
        reg.evaluate_all(Metal::Silver, 29.0, 2).unwrap();
        assert_eq!(reg.evaluate_all(Metal::Silver, 31.0, 3).unwrap().len(), 1);
    }

    #[test]
    fn test_rebaseline_per_chat() {
        let mut reg = WatchRegistry::new();
        reg.upsert(OWNER, Metal::Silver, Direction::Above, 30.0, Persistence::Persistent)
            .unwrap();
        reg.upsert(5, Metal::Silver, Direction::Above, 30.0, Persistence::Persistent)
            .unwrap();
        reg.evaluate_all(Metal::Silver, 29.0, 0).unwrap();

        reg.rebaseline(Some(OWNER));
        let alerts = reg.evaluate_all(Metal::Silver, 31.0, 1_000).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].chat_id, 5);
    }
}
