/// Logger configuration derived from command-line flags
///
/// Flags understood:
/// - `--debug-<tag>`   enable DEBUG output for one tag
/// - `--verbose`       enable VERBOSE output for every tag
/// - `--verbose-<tag>` enable VERBOSE output for one tag
/// - `--quiet`         only WARNING and ERROR
/// - `--no-log-file`   console output only
use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Most detailed level that may be printed
    pub min_level: LogLevel,
    /// Tags with DEBUG output enabled
    pub debug_tags: HashSet<String>,
    /// Tags with VERBOSE output enabled
    pub verbose_tags: HashSet<String>,
    /// When non-empty, only these tags are printed (errors always pass)
    pub enabled_tags: HashSet<String>,
    /// Mirror console output into the log file
    pub file_logging: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
            enabled_tags: HashSet::new(),
            file_logging: true,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

pub fn update_logger_config<F: FnOnce(&mut LoggerConfig)>(f: F) {
    f(&mut LOGGER_CONFIG.write());
}

/// Build the logger configuration from an argument list
pub fn config_from_args(args: &[String]) -> LoggerConfig {
    let mut config = LoggerConfig::default();

    for arg in args {
        if arg == "--verbose" {
            config.min_level = LogLevel::Verbose;
        } else if arg == "--quiet" {
            config.min_level = LogLevel::Warning;
        } else if arg == "--no-log-file" {
            config.file_logging = false;
        } else if let Some(tag) = arg.strip_prefix("--debug-") {
            config.debug_tags.insert(tag.to_lowercase());
            if config.min_level < LogLevel::Debug {
                config.min_level = LogLevel::Debug;
            }
        } else if let Some(tag) = arg.strip_prefix("--verbose-") {
            config.verbose_tags.insert(tag.to_lowercase());
            config.min_level = LogLevel::Verbose;
        }
    }

    config
}

/// Scan the process arguments and install the resulting configuration
pub fn init_from_args() {
    set_logger_config(config_from_args(&arguments::get_cmd_args()));
}

pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = LOGGER_CONFIG.read();
    let key = tag.to_debug_key();
    config.debug_tags.contains(&key) || config.verbose_tags.contains(&key)
}

pub fn is_verbose_enabled_for_tag(tag: &LogTag) -> bool {
    LOGGER_CONFIG
        .read()
        .verbose_tags
        .contains(&tag.to_debug_key())
}
