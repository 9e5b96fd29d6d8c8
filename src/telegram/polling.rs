//! Long-polling loop for incoming messages

use super::router::MessageRouter;
use crate::logger::{self, LogTag};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::requests::Request;
use teloxide::types::{Update, UpdateKind};
use tokio::sync::Notify;

pub struct PollingOptions {
    pub timeout_secs: u32,
    pub error_backoff: Duration,
}

/// Route every text message in a batch; returns the next offset
async fn dispatch(router: &MessageRouter, updates: Vec<Update>, mut offset: i32) -> i32 {
    for update in updates {
        offset = offset.max(update.id.0 as i32 + 1);

        if let UpdateKind::Message(message) = update.kind {
            match message.text() {
                Some(text) => {
                    router.handle_message(message.chat.id.0, text).await;
                }
                None => logger::debug(
                    LogTag::Telegram,
                    &format!("Skipping non-text message from chat {}", message.chat.id.0),
                ),
            }
        }
    }
    offset
}

/// Poll getUpdates until shutdown.
///
/// Errors are logged and retried after `error_backoff`; the loop itself
/// never gives up.
pub async fn run_polling(
    bot: Bot,
    router: Arc<MessageRouter>,
    options: PollingOptions,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
) {
    let shutdown_signal = shutdown.notified();
    tokio::pin!(shutdown_signal);

    running.store(true, Ordering::SeqCst);
    logger::info(
        LogTag::Telegram,
        &format!("Polling for messages (owner chat {})", router.owner_id()),
    );

    let mut offset: i32 = 0;
    loop {
        let mut request = bot.get_updates().timeout(options.timeout_secs);
        if offset > 0 {
            request = request.offset(offset);
        }

        let result = tokio::select! {
            _ = &mut shutdown_signal => break,
            result = request.send() => result,
        };

        match result {
            Ok(updates) => {
                if updates.is_empty() {
                    continue;
                }
                tokio::select! {
                    _ = &mut shutdown_signal => break,
                    next = dispatch(&router, updates, offset) => offset = next,
                }
            }
            Err(e) => {
                logger::warning(
                    LogTag::Telegram,
                    &format!(
                        "getUpdates failed, retrying in {}s: {}",
                        options.error_backoff.as_secs(),
                        e
                    ),
                );
                tokio::select! {
                    _ = &mut shutdown_signal => break,
                    _ = tokio::time::sleep(options.error_backoff) => {}
                }
            }
        }
    }

    running.store(false, Ordering::SeqCst);
    logger::info(LogTag::Telegram, "Polling stopped");
}
