//! Structured logging system for BlinckyBot
//!
//! This module provides a small, ergonomic logging API with:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-tag debug control via --debug-<tag> flags
//! - Dual output: colored console + file persistence
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blinckybot::logger::{self, LogTag};
//!
//! logger::error(LogTag::Price, "Quote request failed");
//! logger::warning(LogTag::Telegram, "Message from unknown chat ignored");
//! logger::info(LogTag::Tracker, "Tracking enabled");
//! logger::debug(LogTag::Alerts, "Watch re-baselined"); // Only with --debug-alerts
//! logger::verbose(LogTag::Llm, "Raw completion body"); // Only with --verbose
//! ```
//!
//! Call [`init`] once at startup, before any logging occurs.

mod config;
mod core;
mod file;
mod format;
mod levels;
mod tags;

pub use config::{
    config_from_args, get_logger_config, init_from_args, set_logger_config,
    update_logger_config, LoggerConfig,
};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger system
///
/// Parses debug flags from the command line, then opens the log file.
pub fn init() {
    config::init_from_args();
    file::init_file_logging();
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (shown unless filtered by tag)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level
///
/// Only shown when `--debug-<tag>` was passed for this tag.
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (very detailed tracing, `--verbose`)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Force flush all pending log writes
///
/// Call this during shutdown to ensure all logs are written to disk.
pub fn flush() {
    file::flush_file_logging();
}
