/// Plain-text rendering of alerts and watches
use super::types::{Alert, Persistence};
use super::watch::ThresholdWatch;
use chrono::{TimeZone, Utc};

/// Price with two decimals, more for sub-dollar quotes
pub fn format_price(price: f64) -> String {
    if price.abs() < 1.0 {
        format!("{:.4}", price)
    } else {
        format!("{:.2}", price)
    }
}

/// UTC wall-clock time for a millisecond timestamp
pub fn format_millis(at_millis: i64) -> String {
    match Utc.timestamp_millis_opt(at_millis).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => at_millis.to_string(),
    }
}

pub fn format_alert(alert: &Alert) -> String {
    let mut text = format!(
        "{} {} ALERT\nPrice: {} USD/oz\nThreshold: {} ({})",
        alert.direction.emoji(),
        alert.metal.as_str().to_uppercase(),
        format_price(alert.price),
        format_price(alert.threshold),
        alert.direction
    );
    if alert.persistence == Persistence::OneShot {
        text.push_str("\nOne-shot alert, now removed.");
    }
    text
}

/// One status line per watch
pub fn format_watch_line(watch: &ThresholdWatch) -> String {
    let last_alert = watch
        .last_alert_at()
        .map(format_millis)
        .unwrap_or_else(|| "never".to_string());
    format!(
        "{} {} {} {} ({}), last alert: {}",
        watch.metal().emoji(),
        watch.metal(),
        watch.direction(),
        format_price(watch.threshold()),
        watch.persistence().label(),
        last_alert
    )
}
