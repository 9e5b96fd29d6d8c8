//! Command parsing
//!
//! Accepted shapes: `/name`, `/<metal>_name`, `/name@botname`, followed by
//! whitespace separated arguments. Prices may use `,` as the decimal
//! separator.

use crate::alerts::{Direction, Persistence};
use crate::errors::CommandError;
use crate::pricing::Metal;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    /// Switch tracking on (a metal prefix is accepted and ignored)
    On,
    Off,
    Now(Metal),
    SetThreshold {
        metal: Metal,
        direction: Direction,
        threshold: f64,
        persistence: Persistence,
    },
    /// No metal prefix clears every metal; no argument clears both directions
    Clear {
        metal: Option<Metal>,
        direction: Option<Direction>,
    },
    Status {
        metal: Option<Metal>,
    },
}

const COMMAND_NAMES: &[&str] = &[
    "start", "help", "on", "off", "now", "price", "above", "below", "clear", "status",
];

/// Split `silver_above` into an optional metal and the bare command name
fn split_metal_prefix(name: &str) -> Result<(Option<Metal>, &str), CommandError> {
    if COMMAND_NAMES.contains(&name) {
        return Ok((None, name));
    }

    match name.split_once('_') {
        Some((prefix, rest)) => match prefix.parse::<Metal>() {
            Ok(metal) => Ok((Some(metal), rest)),
            Err(_) if COMMAND_NAMES.contains(&rest) => Err(CommandError::UnknownMetal(prefix.to_string())),
            Err(_) => Err(CommandError::UnknownCommand(name.to_string())),
        },
        None => Err(CommandError::UnknownCommand(name.to_string())),
    }
}

/// Parse a threshold argument: finite and strictly positive
pub fn parse_price(raw: &str) -> Result<f64, CommandError> {
    let normalized = raw.trim().replace(',', ".");
    let normalized = normalized.trim_start_matches('$');
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(CommandError::InvalidNumber(raw.to_string())),
    }
}

fn parse_persistence(arg: Option<&str>) -> Result<Persistence, CommandError> {
    match arg.map(|a| a.to_lowercase()) {
        None => Ok(Persistence::Persistent),
        Some(a) if a == "once" || a == "oneshot" || a == "one-shot" => Ok(Persistence::OneShot),
        Some(a) if a == "always" || a == "persistent" => Ok(Persistence::Persistent),
        Some(a) => Err(CommandError::UnexpectedArgument(a)),
    }
}

fn parse_direction(arg: &str) -> Result<Direction, CommandError> {
    match arg.to_lowercase().as_str() {
        "above" | "up" => Ok(Direction::Above),
        "below" | "down" => Ok(Direction::Below),
        other => Err(CommandError::UnexpectedArgument(other.to_string())),
    }
}

fn no_more(args: &[&str]) -> Result<(), CommandError> {
    match args.first() {
        Some(extra) => Err(CommandError::UnexpectedArgument(extra.to_string())),
        None => Ok(()),
    }
}

/// Parse one message.
///
/// `Ok(None)` means plain text, not a command. `default_metal` applies to
/// commands written without a metal prefix.
pub fn parse_command(text: &str, default_metal: Metal) -> Result<Option<Command>, CommandError> {
    let text = text.trim();
    let Some(body) = text.strip_prefix('/') else {
        return Ok(None);
    };

    let mut tokens = body.split_whitespace();
    let head = tokens.next().unwrap_or_default();
    let args: Vec<&str> = tokens.collect();

    let name = head.split('@').next().unwrap_or_default().to_lowercase();
    if name.is_empty() {
        return Err(CommandError::UnknownCommand(String::new()));
    }

    let (metal, command) = split_metal_prefix(&name)?;
    let chosen = metal.unwrap_or(default_metal);

    let parsed = match command {
        "start" => {
            no_more(&args)?;
            Command::Start
        }
        "help" => Command::Help,
        "on" => {
            no_more(&args)?;
            Command::On
        }
        "off" => {
            no_more(&args)?;
            Command::Off
        }
        "now" | "price" => {
            no_more(&args)?;
            Command::Now(chosen)
        }
        "above" | "below" => {
            let direction = if command == "above" { Direction::Above } else { Direction::Below };
            let raw = args
                .first()
                .ok_or_else(|| CommandError::MissingArgument(name.clone()))?;
            let threshold = parse_price(raw)?;
            let persistence = parse_persistence(args.get(1).copied())?;
            no_more(args.get(2..).unwrap_or_default())?;
            Command::SetThreshold {
                metal: chosen,
                direction,
                threshold,
                persistence,
            }
        }
        "clear" => {
            let direction = args.first().map(|a| parse_direction(a)).transpose()?;
            no_more(args.get(1..).unwrap_or_default())?;
            Command::Clear { metal, direction }
        }
        "status" => {
            no_more(&args)?;
            Command::Status { metal }
        }
        other => return Err(CommandError::UnknownCommand(other.to_string())),
    };

    Ok(Some(parsed))
}
