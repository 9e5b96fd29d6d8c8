// Bot lifecycle built on ServiceManager

use crate::alerts::WatchRegistry;
use crate::config::{load_config, Config};
use crate::errors::BotError;
use crate::logger::{self, LogTag};
use crate::notifications::{LogTransport, Transport};
use crate::pricing::{create_price_source, Metal};
use crate::services::ServiceManager;
use crate::telegram::{CommandHandler, LlmRelay, MessageRouter};
use crate::tracker::{Tracker, TrackerService};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Configuration file in effect: `--config <path>` or the default location
pub fn resolve_config_path() -> PathBuf {
    crate::arguments::get_config_path_override()
        .map(PathBuf::from)
        .unwrap_or_else(crate::paths::get_config_path)
}

/// Load and validate configuration, then exit: `--check-config`
pub fn check_config() -> Result<(), BotError> {
    let path = resolve_config_path();
    let config = load_config(&path).map_err(BotError::Config)?;
    logger::info(
        LogTag::Config,
        &format!(
            "{} is valid (provider {}, every {}s, telegram {}, llm relay {})",
            path.display(),
            config.price.provider,
            config.tracker.check_interval_secs,
            if config.telegram.enabled { "on" } else { "off" },
            if config.llm.enabled { "on" } else { "off" }
        ),
    );
    Ok(())
}

/// Main bot execution function: load config, start services, wait for a
/// shutdown signal, stop services
pub async fn run_bot() -> Result<(), BotError> {
    logger::info(LogTag::System, "BlinckyBot starting up...");

    let config_path = resolve_config_path();
    let config = load_config(&config_path)
        .map_err(|e| BotError::Config(format!("{} ({})", e, config_path.display())))?;
    logger::info(
        LogTag::System,
        &format!("Configuration loaded from {}", config_path.display()),
    );

    let shutdown = install_signal_handler().map_err(BotError::Service)?;

    let mut service_manager = ServiceManager::new(config.clone());
    register_all_services(&mut service_manager, &config).map_err(BotError::Config)?;
    if let Err(e) = service_manager.start_all().await {
        service_manager.stop_all().await;
        return Err(BotError::Service(e));
    }

    let mut health: Vec<_> = service_manager.get_health().await.into_iter().collect();
    health.sort_by_key(|(name, _)| *name);
    for (name, status) in health {
        logger::info(LogTag::System, &format!("{}: {}", name, status));
    }
    logger::info(LogTag::System, "All services running (Ctrl+C to stop)");
    shutdown.notified().await;

    logger::info(LogTag::System, "Initiating graceful shutdown...");
    service_manager.stop_all().await;
    logger::info(LogTag::System, "BlinckyBot shut down successfully");
    logger::flush();

    Ok(())
}

/// Build the shared components and register every service
fn register_all_services(manager: &mut ServiceManager, config: &Config) -> Result<(), String> {
    logger::info(LogTag::System, "Registering services...");

    let source = create_price_source(&config.price).map_err(|e| e.to_string())?;
    let default_metal: Metal = config.tracker.default_metal.parse()?;
    let interval = Duration::from_secs(config.tracker.check_interval_secs);

    let transport = build_transport(config);
    let registry = WatchRegistry::with_cooldown_ms(config.tracker.cooldown_ms);
    let tracker = Arc::new(Tracker::new(
        registry,
        source,
        transport.clone(),
        config.tracker.enabled_at_start,
    ));

    manager.register(Box::new(TrackerService::new(tracker.clone(), interval)));

    let relay = if config.telegram.llm_relay_enabled {
        LlmRelay::from_config(&config.llm)?
    } else {
        None
    };
    let handler = CommandHandler::new(tracker, default_metal, interval.as_secs());
    let router = Arc::new(MessageRouter::new(
        config.telegram.owner_id,
        config.telegram.commands_enabled,
        handler,
        relay,
        transport.clone(),
    ));

    register_telegram(manager, config, router, transport);
    Ok(())
}

#[cfg(feature = "telegram")]
fn build_transport(config: &Config) -> Arc<dyn Transport> {
    if config.telegram.enabled {
        let bot = crate::telegram::create_bot(&config.telegram.bot_token);
        Arc::new(crate::telegram::TelegramTransport::new(bot))
    } else {
        logger::info(LogTag::Telegram, "Telegram disabled, alerts go to the log");
        Arc::new(LogTransport)
    }
}

#[cfg(not(feature = "telegram"))]
fn build_transport(_config: &Config) -> Arc<dyn Transport> {
    logger::info(LogTag::Telegram, "Built without Telegram support, alerts go to the log");
    Arc::new(LogTransport)
}

#[cfg(feature = "telegram")]
fn register_telegram(
    manager: &mut ServiceManager,
    config: &Config,
    router: Arc<MessageRouter>,
    transport: Arc<dyn Transport>,
) {
    if !config.telegram.enabled {
        return;
    }
    let bot = crate::telegram::create_bot(&config.telegram.bot_token);
    manager.register(Box::new(crate::telegram::TelegramService::new(
        bot,
        router,
        transport,
        config.telegram.poll_timeout_secs,
        Duration::from_secs(config.telegram.error_backoff_secs),
    )));
}

#[cfg(not(feature = "telegram"))]
fn register_telegram(
    _manager: &mut ServiceManager,
    _config: &Config,
    _router: Arc<MessageRouter>,
    _transport: Arc<dyn Transport>,
) {
}

/// Ctrl+C / SIGTERM handler. The first signal requests a graceful
/// shutdown; a second one exits immediately.
fn install_signal_handler() -> Result<Arc<Notify>, String> {
    let shutdown = Arc::new(Notify::new());
    let signal = shutdown.clone();
    let received = AtomicBool::new(false);

    ctrlc::set_handler(move || {
        if received.swap(true, Ordering::SeqCst) {
            logger::error(LogTag::System, "Second Ctrl+C detected, forcing immediate exit.");
            logger::flush();
            // 130 is the conventional exit code for SIGINT
            std::process::exit(130);
        }
        logger::warning(
            LogTag::System,
            "Shutdown signal received. Press Ctrl+C again to force kill.",
        );
        // notify_one stores a permit if nobody is waiting yet
        signal.notify_one();
    })
    .map_err(|e| format!("Failed to install signal handler: {}", e))?;

    Ok(shutdown)
}
