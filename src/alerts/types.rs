/// Core alert types: directions, sides, keys and decisions
use crate::pricing::Metal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum interval between two alerts of one persistent watch
pub const COOLDOWN_MS: i64 = 60_000;

// ============================================================================
// DIRECTION / SIDE
// ============================================================================

/// Side of the threshold that triggers a watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Above => "above",
            Direction::Below => "below",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Direction::Above => "📈",
            Direction::Below => "📉",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Last observed position of the price relative to the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Above,
    Below,
    /// No observation since creation or the last re-baseline
    Unknown,
}

impl Side {
    /// Classify a price; a price equal to the threshold counts as Above
    pub fn classify(price: f64, threshold: f64) -> Side {
        if price >= threshold {
            Side::Above
        } else {
            Side::Below
        }
    }

    pub fn is_target(&self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (Side::Above, Direction::Above) | (Side::Below, Direction::Below)
        )
    }
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persistence {
    /// Removed right after the first alert
    OneShot,
    /// Keeps monitoring; repeat alerts are rate limited by the cooldown
    Persistent,
}

impl Persistence {
    pub fn label(&self) -> &'static str {
        match self {
            Persistence::OneShot => "once",
            Persistence::Persistent => "persistent",
        }
    }
}

// ============================================================================
// KEYS / OUTCOMES
// ============================================================================

/// Registry key: at most one watch per chat, metal and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchKey {
    pub chat_id: i64,
    pub metal: Metal,
    pub direction: Direction,
}

impl WatchKey {
    pub fn new(chat_id: i64, metal: Metal, direction: Direction) -> Self {
        Self {
            chat_id,
            metal,
            direction,
        }
    }
}

/// A fired alert, ready to be rendered and dispatched
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub chat_id: i64,
    pub metal: Metal,
    pub direction: Direction,
    pub threshold: f64,
    pub price: f64,
    pub at_millis: i64,
    pub persistence: Persistence,
}

/// Why an evaluation did not alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quiet {
    /// First observation, only establishes the side
    Baseline,
    /// Same side as before, or a move away from the target side
    NoCrossing,
    /// Crossing into the target happened inside the cooldown window
    Cooldown,
    /// One-shot watch already fired
    Spent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlertDecision {
    NoAlert(Quiet),
    Alert(Alert),
}

impl AlertDecision {
    pub fn is_alert(&self) -> bool {
        matches!(self, AlertDecision::Alert(_))
    }

    pub fn into_alert(self) -> Option<Alert> {
        match self {
            AlertDecision::Alert(alert) => Some(alert),
            AlertDecision::NoAlert(_) => None,
        }
    }
}
