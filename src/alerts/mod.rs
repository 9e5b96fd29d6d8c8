/// Threshold-crossing alert core
///
/// `ThresholdWatch` decides, sample by sample, whether a price move is an
/// alert. `WatchRegistry` groups watches by chat, metal and direction. The
/// module does no I/O; timing and delivery belong to the tracker.
pub mod format;
pub mod registry;
pub mod types;
pub mod watch;

pub use format::{format_alert, format_millis, format_price, format_watch_line};
pub use registry::WatchRegistry;
pub use types::{Alert, AlertDecision, Direction, Persistence, Quiet, Side, WatchKey, COOLDOWN_MS};
pub use watch::ThresholdWatch;
