//! Command execution against the shared tracker
//!
//! Every handler returns the reply text; sending is the router's job.

use super::parser::Command;
use crate::alerts::{format_price, Direction, Persistence};
use crate::logger::{self, LogTag};
use crate::pricing::Metal;
use crate::telegram::formatters::{format_quote, format_status, help_text, StatusView};
use crate::tracker::{now_millis, Tracker};
use std::sync::Arc;

pub struct CommandHandler {
    tracker: Arc<Tracker>,
    default_metal: Metal,
    interval_secs: u64,
}

impl CommandHandler {
    pub fn new(tracker: Arc<Tracker>, default_metal: Metal, interval_secs: u64) -> Self {
        Self {
            tracker,
            default_metal,
            interval_secs,
        }
    }

    pub fn default_metal(&self) -> Metal {
        self.default_metal
    }

    pub async fn execute(&self, chat_id: i64, command: Command) -> String {
        logger::debug(LogTag::Commands, &format!("chat {} -> {:?}", chat_id, command));

        match command {
            Command::Start | Command::Help => help_text(self.default_metal),
            Command::On => self.handle_on(chat_id).await,
            Command::Off => self.handle_off().await,
            Command::Now(metal) => self.handle_now(metal).await,
            Command::SetThreshold {
                metal,
                direction,
                threshold,
                persistence,
            } => {
                self.handle_set_threshold(chat_id, metal, direction, threshold, persistence)
                    .await
            }
            Command::Clear { metal, direction } => self.handle_clear(chat_id, metal, direction).await,
            Command::Status { metal } => self.handle_status(chat_id, metal).await,
        }
    }

    async fn handle_on(&self, chat_id: i64) -> String {
        let was_enabled = self.tracker.set_enabled(true).await;
        let watch_count = self
            .tracker
            .state()
            .lock()
            .await
            .registry
            .list_for_chat(chat_id)
            .len();

        let mut reply = if was_enabled {
            "🟢 Tracking is already ON.".to_string()
        } else {
            format!("🟢 Tracking ON, checking every {}s.", self.interval_secs)
        };
        if watch_count == 0 {
            reply.push_str("\nNo alerts set yet. Use /above or /below to add one.");
        }
        reply
    }

    async fn handle_off(&self) -> String {
        if self.tracker.set_enabled(false).await {
            "🔴 Tracking OFF. Alerts are kept; /on resumes with fresh baselines.".to_string()
        } else {
            "🔴 Tracking is already OFF.".to_string()
        }
    }

    async fn handle_now(&self, metal: Metal) -> String {
        match self.tracker.quote(metal).await {
            Ok(price) => format_quote(metal, price),
            Err(e) => {
                logger::warning(LogTag::Commands, &format!("Price request failed: {}", e));
                format!("⚠️ Could not fetch the {} price: {}", metal.as_str(), e)
            }
        }
    }

    async fn handle_set_threshold(
        &self,
        chat_id: i64,
        metal: Metal,
        direction: Direction,
        threshold: f64,
        persistence: Persistence,
    ) -> String {
        let state = self.tracker.state();
        let mut state = state.lock().await;

        let replaced = match state
            .registry
            .upsert(chat_id, metal, direction, threshold, persistence)
        {
            Ok(replaced) => replaced,
            Err(e) => return format!("❌ {}", e),
        };

        logger::info(
            LogTag::Commands,
            &format!(
                "chat {} set {} {} {} ({})",
                chat_id,
                metal.as_str(),
                direction,
                threshold,
                persistence.label()
            ),
        );

        let mut reply = format!(
            "{} Alert set: {} {} {} ({})",
            direction.emoji(),
            metal,
            direction,
            format_price(threshold),
            persistence.label()
        );
        if let Some(previous) = replaced {
            reply.push_str(&format!(
                "\nReplaces the previous {} threshold {}.",
                direction,
                format_price(previous.threshold())
            ));
        }
        if !state.enabled {
            reply.push_str("\nTracking is OFF, send /on to start.");
        }
        reply
    }

    async fn handle_clear(&self, chat_id: i64, metal: Option<Metal>, direction: Option<Direction>) -> String {
        let removed = self
            .tracker
            .state()
            .lock()
            .await
            .registry
            .remove(chat_id, metal, direction);

        match removed {
            0 => "Nothing to clear.".to_string(),
            1 => "🗑 Removed 1 alert.".to_string(),
            n => format!("🗑 Removed {} alerts.", n),
        }
    }

    async fn handle_status(&self, chat_id: i64, metal: Option<Metal>) -> String {
        let state = self.tracker.state();
        let state = state.lock().await;

        let watches: Vec<_> = state
            .registry
            .list_for_chat(chat_id)
            .into_iter()
            .filter(|w| metal.map_or(true, |m| w.metal() == m))
            .collect();

        let mut quotes: Vec<_> = state
            .last_quotes
            .iter()
            .filter(|(m, _)| metal.map_or(true, |wanted| **m == wanted))
            .map(|(m, q)| (*m, *q))
            .collect();
        quotes.sort_by_key(|(m, _)| *m);

        let source = self.tracker.source_name();
        let view = StatusView {
            enabled: state.enabled,
            source: &source,
            interval_secs: self.interval_secs,
            watches: &watches,
            quotes,
            last_tick_at: state.last_tick_at,
            last_error: state.last_error.as_deref(),
        };
        format_status(&view, now_millis())
    }
}
