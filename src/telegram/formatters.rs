//! Plain-text reply formatters
//!
//! Replies are sent without a parse mode, so nothing here needs escaping.

use crate::alerts::{format_millis, format_price, format_watch_line, ThresholdWatch};
use crate::pricing::Metal;
use crate::tracker::Quote;

pub fn help_text(default_metal: Metal) -> String {
    format!(
        "🤖 BlinckyBot\n\n\
         /on - start price tracking\n\
         /off - stop price tracking\n\
         /now - current {metal} price\n\
         /above <price> [once] - alert when the price rises above\n\
         /below <price> [once] - alert when the price falls below\n\
         /clear [above|below] - remove alerts\n\
         /status - tracking state and alerts\n\n\
         Prefix a command with a metal to pick another one, e.g. /gold_above 2500.\n\
         Metals: {metals}.\n\
         Without a prefix commands use {metal}.\n\
         Any other message is answered by the assistant when it is enabled.",
        metal = default_metal.as_str(),
        metals = Metal::ALL.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", "),
    )
}

pub fn format_quote(metal: Metal, price: f64) -> String {
    format!(
        "{} {} price: {} USD/oz",
        metal.emoji(),
        metal.display_name(),
        format_price(price)
    )
}

/// Human-readable age of a timestamp relative to `now_ms`
pub fn format_age(at_millis: i64, now_ms: i64) -> String {
    let secs = ((now_ms - at_millis).max(0)) / 1000;
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h {}m ago", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}

/// Everything `/status` shows, already filtered for one chat
pub struct StatusView<'a> {
    pub enabled: bool,
    pub source: &'a str,
    pub interval_secs: u64,
    pub watches: &'a [ThresholdWatch],
    pub quotes: Vec<(Metal, Quote)>,
    pub last_tick_at: Option<i64>,
    pub last_error: Option<&'a str>,
}

pub fn format_status(view: &StatusView<'_>, now_ms: i64) -> String {
    let mut lines = vec![
        format!(
            "{} Tracking: {}",
            if view.enabled { "🟢" } else { "🔴" },
            if view.enabled { "ON" } else { "OFF" }
        ),
        format!("Source: {} (every {}s)", view.source, view.interval_secs),
    ];

    lines.push(String::new());
    if view.watches.is_empty() {
        lines.push("No alerts set. Use /above or /below to add one.".to_string());
    } else {
        lines.push(format!("Alerts ({}):", view.watches.len()));
        lines.extend(view.watches.iter().map(format_watch_line));
    }

    if !view.quotes.is_empty() {
        lines.push(String::new());
        lines.push("Last prices:".to_string());
        for (metal, quote) in &view.quotes {
            lines.push(format!(
                "{} {}: {} ({})",
                metal.emoji(),
                metal.display_name(),
                format_price(quote.price),
                format_age(quote.at_millis, now_ms)
            ));
        }
    }

    if let Some(at) = view.last_tick_at {
        lines.push(String::new());
        lines.push(format!("Last check: {}", format_millis(at)));
    }
    if let Some(err) = view.last_error {
        lines.push(format!("⚠️ Last error: {}", err));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{Direction, Persistence};

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(0, 42_000), "42s ago");
        assert_eq!(format_age(0, 5 * 60_000), "5m ago");
        assert_eq!(format_age(0, 2 * 3_600_000 + 60_000), "2h 1m ago");
        assert_eq!(format_age(0, 3 * 86_400_000), "3d ago");
        assert_eq!(format_age(10_000, 0), "0s ago");
    }

    #[test]
    fn test_status_without_watches() {
        let view = StatusView {
            enabled: false,
            source: "metals_live",
            interval_secs: 60,
            watches: &[],
            quotes: vec![],
            last_tick_at: None,
            last_error: None,
        };
        let text = format_status(&view, 0);
        assert!(text.starts_with("🔴 Tracking: OFF"));
        assert!(text.contains("No alerts set"));
        assert!(!text.contains("Last check"));
    }

    #[test]
    fn test_status_with_watches_and_quotes() {
        let watch = ThresholdWatch::new(1, Metal::Silver, Direction::Above, 30.0, Persistence::OneShot).unwrap();
        let watches = vec![watch];
        let view = StatusView {
            enabled: true,
            source: "yahoo",
            interval_secs: 60,
            watches: &watches,
            quotes: vec![(Metal::Silver, Quote { price: 29.5, at_millis: 0 })],
            last_tick_at: Some(0),
            last_error: Some("[yahoo] upstream unavailable: HTTP 502"),
        };
        let text = format_status(&view, 120_000);
        assert!(text.contains("Alerts (1):"));
        assert!(text.contains("above 30.00 (once)"));
        assert!(text.contains("29.50 (2m ago)"));
        assert!(text.contains("Last check: 1970-01-01 00:00:00 UTC"));
        assert!(text.contains("HTTP 502"));
    }

    #[test]
    fn test_help_mentions_default_metal() {
        let text = help_text(Metal::Gold);
        assert!(text.contains("current gold price"));
        assert!(text.contains("/gold_above 2500"));
        assert!(text.contains("palladium"));
    }
}
