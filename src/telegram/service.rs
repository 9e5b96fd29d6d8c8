//! Telegram service integration with ServiceManager

use super::bot::verify_bot;
use super::polling::{run_polling, PollingOptions};
use super::router::MessageRouter;
use crate::config::Config;
use crate::logger::{self, LogTag};
use crate::notifications::Transport;
use crate::services::{Service, ServiceHealth};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub struct TelegramService {
    bot: Bot,
    router: Arc<MessageRouter>,
    transport: Arc<dyn Transport>,
    poll_timeout_secs: u32,
    error_backoff: Duration,
    /// Set while the polling task is alive
    polling: Arc<AtomicBool>,
    username: Option<String>,
}

impl TelegramService {
    pub fn new(
        bot: Bot,
        router: Arc<MessageRouter>,
        transport: Arc<dyn Transport>,
        poll_timeout_secs: u32,
        error_backoff: Duration,
    ) -> Self {
        Self {
            bot,
            router,
            transport,
            poll_timeout_secs,
            error_backoff,
            polling: Arc::new(AtomicBool::new(false)),
            username: None,
        }
    }
}

#[async_trait]
impl Service for TelegramService {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["tracker"]
    }

    fn is_enabled(&self, config: &Config) -> bool {
        config.telegram.enabled && !config.telegram.bot_token.trim().is_empty()
    }

    async fn initialize(&mut self) -> Result<(), String> {
        self.username = Some(verify_bot(&self.bot).await?);
        if self.router.has_relay() {
            logger::info(LogTag::Telegram, "Plain-text messages go to the LLM relay");
        }
        Ok(())
    }

    async fn start(&mut self, shutdown: Arc<Notify>) -> Result<Vec<JoinHandle<()>>, String> {
        let owner = self.router.owner_id();
        let greeting = format!(
            "🤖 BlinckyBot is online as @{}. Send /help for commands.",
            self.username.as_deref().unwrap_or("unknown")
        );
        if let Err(e) = self.transport.send(owner, &greeting).await {
            logger::warning(LogTag::Telegram, &format!("Startup message failed: {}", e));
        }

        let options = PollingOptions {
            timeout_secs: self.poll_timeout_secs,
            error_backoff: self.error_backoff,
        };
        let handle = tokio::spawn(run_polling(
            self.bot.clone(),
            self.router.clone(),
            options,
            self.polling.clone(),
            shutdown,
        ));
        Ok(vec![handle])
    }

    async fn stop(&mut self) -> Result<(), String> {
        logger::info(LogTag::Telegram, "Telegram service shutting down");
        Ok(())
    }

    async fn health(&self) -> ServiceHealth {
        if self.polling.load(Ordering::SeqCst) {
            ServiceHealth::Healthy
        } else {
            ServiceHealth::Unhealthy("polling loop is not running".to_string())
        }
    }
}
