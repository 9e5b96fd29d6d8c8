use anyhow::Context;
use blinckybot::{
    arguments::{is_check_config_enabled, patterns, print_help},
    logger::{self as logger, LogTag},
};

/// Main entry point for BlinckyBot
///
/// - `--help`: print usage and exit
/// - `--check-config`: validate the configuration and exit
/// - default: run the bot until Ctrl+C
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger needs the logs directory to create its file
    if let Err(e) = blinckybot::paths::ensure_all_directories() {
        eprintln!("❌ Failed to create required directories: {}", e);
        std::process::exit(1);
    }

    logger::init();

    if patterns::is_help_requested() {
        print_help();
        return Ok(());
    }

    if is_check_config_enabled() {
        let result = blinckybot::run::check_config();
        logger::flush();
        return result.context("Invalid configuration");
    }

    if let Err(e) = blinckybot::run::run_bot().await {
        logger::error(LogTag::System, &format!("BlinckyBot failed: {}", e));
        logger::flush();
        std::process::exit(1);
    }

    Ok(())
}
