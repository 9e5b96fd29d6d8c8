//! Outbound message delivery
//!
//! The tracker and the command handlers only see `Transport`. The Telegram
//! implementation lives in `crate::telegram`; `LogTransport` stands in when
//! the bot runs without the `telegram` feature.

use crate::errors::DeliveryError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;

/// Telegram's hard limit for one text message, in characters
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver plain text to a chat. Failures are reported, never retried.
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError>;
}

/// Writes every outbound message to the log instead of a chat
pub struct LogTransport;

#[async_trait]
impl Transport for LogTransport {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError> {
        logger::info(
            LogTag::Alerts,
            &format!("[chat {}] {}", chat_id, text.replace('\n', " | ")),
        );
        Ok(())
    }
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Prefers breaking after a newline, then after a space, and only cuts
/// inside a word when a single word is longer than the limit.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > max_chars {
        let hard_end = rest
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let window = &rest[..hard_end];

        let cut = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .filter(|&i| i > 0)
            .map(|i| i + 1)
            .unwrap_or(hard_end);

        let chunk = rest[..cut].trim_end();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        rest = &rest[cut..];
    }

    if !rest.trim().is_empty() || chunks.is_empty() {
        chunks.push(rest.trim_end().to_string());
    }
    chunks
}

/// Send `text` split to the transport's size limit, stopping at the first failure
pub async fn send_long(transport: &dyn Transport, chat_id: i64, text: &str) -> Result<usize, DeliveryError> {
    let chunks = split_message(text, MAX_MESSAGE_CHARS);
    for chunk in &chunks {
        transport.send(chat_id, chunk).await?;
    }
    Ok(chunks.len())
}
