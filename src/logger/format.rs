//! Log formatting and output with ANSI colors and text wrapping
//!
//! Handles:
//! - Colorized console output with tag and level formatting
//! - Text wrapping at word boundaries
//! - Dual output (console + file)
//! - Broken pipe handling for piped commands

use super::file::write_to_file;
use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stdout, ErrorKind, Write};

/// Log format widths for alignment
const TAG_WIDTH: usize = 9;
const LEVEL_WIDTH: usize = 7;

/// Maximum line length before wrapping
const MAX_LINE_LENGTH: usize = 140;

pub fn format_and_log(tag: &LogTag, level: LogLevel, message: &str) {
    let now = Local::now();
    let time = now.format("%H:%M:%S").to_string();

    let base_line = format!(
        "{} [{}] [{}] ",
        time.dimmed(),
        format_tag(tag),
        format_level(level)
    );
    // time + brackets + padding, without ANSI codes
    let prefix_width = time.len() + TAG_WIDTH + LEVEL_WIDTH + 7;
    let available = MAX_LINE_LENGTH.saturating_sub(prefix_width).max(40);

    let chunks = wrap_text(message, available);
    let timestamp = now.format("%Y-%m-%d %H:%M:%S").to_string();
    let tag_plain = tag.to_plain_string();

    for (i, chunk) in chunks.iter().enumerate() {
        if i == 0 {
            print_stdout_safe(&format!("{}{}", base_line, chunk));
        } else {
            print_stdout_safe(&format!("{}{}", " ".repeat(prefix_width), chunk));
        }
        write_to_file(&format!(
            "{} [{}] [{}] {}",
            timestamp,
            tag_plain,
            level.as_str(),
            chunk
        ));
    }
}

fn format_tag(tag: &LogTag) -> ColoredString {
    let label = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    match tag {
        LogTag::System => label.bright_yellow().bold(),
        LogTag::Config => label.bright_white().bold(),
        LogTag::Telegram => label.bright_blue().bold(),
        LogTag::Commands => label.bright_cyan().bold(),
        LogTag::Tracker => label.bright_green().bold(),
        LogTag::Alerts => label.bright_magenta().bold(),
        LogTag::Price => label.green().bold(),
        LogTag::Llm => label.bright_purple().bold(),
        LogTag::Test => label.blue().bold(),
        LogTag::Other(_) => label.white().bold(),
    }
}

fn format_level(level: LogLevel) -> ColoredString {
    let label = format!("{:<width$}", level.as_str(), width = LEVEL_WIDTH);
    match level {
        LogLevel::Error => label.bright_red().bold(),
        LogLevel::Warning => label.yellow().bold(),
        LogLevel::Info => label.white().bold(),
        LogLevel::Debug | LogLevel::Verbose => label.dimmed(),
    }
}

/// Print to stdout but ignore broken pipe errors
fn print_stdout_safe(message: &str) {
    let mut out = stdout();
    if let Err(e) = writeln!(out, "{}", message).and_then(|_| out.flush()) {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        let _ = writeln!(std::io::stderr(), "Logger stdout error: {}", e);
    }
}

/// Wrap text at word boundaries, respecting existing newlines.
/// Words longer than `max_width` are split on char boundaries.
pub(crate) fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut result = Vec::new();

    for line in text.split('\n') {
        if line.chars().count() <= max_width {
            result.push(line.to_string());
            continue;
        }

        let mut current = String::new();
        for word in line.split_whitespace() {
            let word_len = word.chars().count();
            let current_len = current.chars().count();

            if word_len > max_width {
                if !current.is_empty() {
                    result.push(std::mem::take(&mut current));
                }
                let chars: Vec<char> = word.chars().collect();
                for piece in chars.chunks(max_width) {
                    result.push(piece.iter().collect());
                }
            } else if current.is_empty() {
                current = word.to_string();
            } else if current_len + 1 + word_len <= max_width {
                current.push(' ');
                current.push_str(word);
            } else {
                result.push(std::mem::replace(&mut current, word.to_string()));
            }
        }

        if !current.is_empty() {
            result.push(current);
        }
    }

    if result.is_empty() {
        result.push(String::new());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_short_line_untouched() {
        assert_eq!(wrap_text("price 24.33", 40), vec!["price 24.33".to_string()]);
    }

    #[test]
    fn test_wrap_respects_newlines() {
        let lines = wrap_text("a\nb", 40);
        assert_eq!(lines, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_wrap_at_word_boundary() {
        let lines = wrap_text("alpha beta gamma delta", 11);
        assert_eq!(lines, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn test_wrap_breaks_long_word() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_empty() {
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }
}
