//! Incoming message routing
//!
//! Only the owner chat is served; anything else is logged and dropped
//! without a reply. Commands go to the handler, other text to the LLM
//! relay when one is configured.

use super::commands::{parse_command, CommandHandler};
use super::relay::LlmRelay;
use crate::logger::{self, LogTag};
use crate::notifications::{send_long, Transport};
use std::sync::Arc;

/// What happened to one incoming message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// Sender is not the owner
    Ignored,
    Command,
    /// Command text that failed to parse; the reply explains why
    Rejected,
    Relayed,
    /// Plain text with no relay configured
    Unhandled,
}

pub struct MessageRouter {
    owner_id: i64,
    commands_enabled: bool,
    handler: CommandHandler,
    relay: Option<LlmRelay>,
    transport: Arc<dyn Transport>,
}

impl MessageRouter {
    pub fn new(
        owner_id: i64,
        commands_enabled: bool,
        handler: CommandHandler,
        relay: Option<LlmRelay>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            owner_id,
            commands_enabled,
            handler,
            relay,
            transport,
        }
    }

    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }

    pub fn has_relay(&self) -> bool {
        self.relay.is_some()
    }

    pub async fn handle_message(&self, chat_id: i64, text: &str) -> Routed {
        if chat_id != self.owner_id {
            logger::warning(
                LogTag::Telegram,
                &format!("Ignoring message from unauthorized chat {}", chat_id),
            );
            return Routed::Ignored;
        }

        let (routed, reply) = match parse_command(text, self.handler.default_metal()) {
            Ok(Some(command)) if self.commands_enabled => {
                (Routed::Command, self.handler.execute(chat_id, command).await)
            }
            Ok(Some(_)) => (
                Routed::Rejected,
                "Commands are disabled in the configuration.".to_string(),
            ),
            Err(e) => {
                logger::debug(LogTag::Commands, &format!("Rejected '{}': {}", text, e));
                (Routed::Rejected, format!("❓ {}. Send /help for the command list.", e))
            }
            Ok(None) => match &self.relay {
                Some(relay) => (Routed::Relayed, self.relay_reply(relay, text).await),
                None => (
                    Routed::Unhandled,
                    "I only understand commands. Send /help for the list.".to_string(),
                ),
            },
        };

        if let Err(e) = send_long(self.transport.as_ref(), chat_id, &reply).await {
            logger::error(LogTag::Telegram, &format!("Reply not delivered: {}", e));
        }
        routed
    }

    async fn relay_reply(&self, relay: &LlmRelay, text: &str) -> String {
        match relay.ask(text).await {
            Ok(answer) => answer,
            Err(e) => {
                logger::warning(LogTag::Llm, &format!("Relay failed: {}", e));
                format!("⚠️ {}", e.user_message())
            }
        }
    }
}
