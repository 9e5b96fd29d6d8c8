//! Telegram bot connection and outbound transport

use crate::errors::DeliveryError;
use crate::logger::{self, LogTag};
use crate::notifications::Transport;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ChatId;

/// Create the bot client; no network call is made here
pub fn create_bot(token: &str) -> Bot {
    Bot::new(token.trim())
}

/// Validate the token with getMe and return the bot's username
pub async fn verify_bot(bot: &Bot) -> Result<String, String> {
    match bot.get_me().await {
        Ok(me) => {
            let username = me.username.as_deref().unwrap_or("unknown").to_string();
            logger::info(
                LogTag::Telegram,
                &format!("Bot connected: @{} (ID: {})", username, me.id),
            );
            Ok(username)
        }
        Err(e) => {
            logger::error(
                LogTag::Telegram,
                &format!("Failed to validate bot token: {}", e),
            );
            Err(format!("Invalid bot token: {}", e))
        }
    }
}

/// Sends plain-text messages through the Bot API
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError> {
        self.bot
            .send_message(ChatId(chat_id), text.to_string())
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::DeliveryFailed {
                chat_id,
                reason: e.to_string(),
            })
    }
}
