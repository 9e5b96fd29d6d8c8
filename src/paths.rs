//! Centralized path resolution for BlinckyBot
//!
//! ## Path Strategy
//!
//! `BLINCKYBOT_HOME` wins when set (container deployments). Otherwise the
//! platform data directory is used:
//! - **macOS**: `~/Library/Application Support/BlinckyBot/`
//! - **Windows**: `%LOCALAPPDATA%\BlinckyBot\`
//! - **Linux**: `$XDG_DATA_HOME/BlinckyBot/` (fallback `~/.local/share/BlinckyBot/`)
//!
//! ```text
//! BlinckyBot/
//! ├── data/
//! │   └── config.toml
//! └── logs/
//!     └── blinckybot_*.log
//! ```

use once_cell::sync::Lazy;
use std::path::PathBuf;

const APP_DIR: &str = "BlinckyBot";
const HOME_ENV: &str = "BLINCKYBOT_HOME";

static BASE_DIRECTORY: Lazy<PathBuf> = Lazy::new(resolve_base_directory);

fn resolve_base_directory() -> PathBuf {
    if let Ok(home) = std::env::var(HOME_ENV) {
        if !home.trim().is_empty() {
            return PathBuf::from(home);
        }
    }

    if let Some(dir) = dirs::data_local_dir() {
        return dir.join(APP_DIR);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(APP_DIR);
    }

    PathBuf::from(APP_DIR)
}

/// Root directory for config and logs
pub fn get_base_directory() -> PathBuf {
    BASE_DIRECTORY.clone()
}

pub fn get_data_directory() -> PathBuf {
    BASE_DIRECTORY.join("data")
}

pub fn get_logs_directory() -> PathBuf {
    BASE_DIRECTORY.join("logs")
}

/// Default configuration file path (overridable with `--config <path>`)
pub fn get_config_path() -> PathBuf {
    get_data_directory().join("config.toml")
}

/// Create every directory the bot writes to
pub fn ensure_all_directories() -> Result<(), String> {
    for dir in [get_data_directory(), get_logs_directory()] {
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create directory {}: {}", dir.display(), e))?;
    }
    Ok(())
}
