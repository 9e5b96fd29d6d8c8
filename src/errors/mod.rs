/// Error types for BlinckyBot
///
/// Each layer owns one enum; `BotError` wraps them for startup code.
/// Nothing here is fatal once the bot is running: the tracker and the
/// Telegram loop log these and keep going.
use thiserror::Error;

// =============================================================================
// ALERT CORE
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlertError {
    /// Price sample is NaN or infinite. Watch state is left untouched.
    #[error("Invalid price sample: {price}")]
    InvalidSample { price: f64 },

    #[error("Invalid threshold: {value}")]
    InvalidThreshold { value: f64 },
}

// =============================================================================
// PRICE SOURCES
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceError {
    #[error("[{provider}] upstream unavailable: {message}")]
    UpstreamUnavailable { provider: String, message: String },

    #[error("[{provider}] malformed quote: {message}")]
    MalformedQuote { provider: String, message: String },

    #[error("[{provider}] API key is not configured")]
    MissingApiKey { provider: String },

    #[error("[{provider}] does not quote {instrument}")]
    UnsupportedInstrument { provider: String, instrument: String },

    #[error("Unknown price provider '{0}'")]
    UnknownProvider(String),
}

impl PriceError {
    pub fn upstream(provider: &str, message: impl Into<String>) -> Self {
        PriceError::UpstreamUnavailable {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub fn malformed(provider: &str, message: impl Into<String>) -> Self {
        PriceError::MalformedQuote {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

// =============================================================================
// MESSAGE DELIVERY
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeliveryError {
    #[error("Delivery to chat {chat_id} failed: {reason}")]
    DeliveryFailed { chat_id: i64, reason: String },
}

// =============================================================================
// COMMAND PARSING
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: /{0}")]
    UnknownCommand(String),

    #[error("Unknown metal: {0}")]
    UnknownMetal(String),

    #[error("Missing price argument for /{0}")]
    MissingArgument(String),

    #[error("Invalid price '{0}'")]
    InvalidNumber(String),

    #[error("Unexpected argument '{0}'")]
    UnexpectedArgument(String),
}

// =============================================================================
// CONFIGURATION / TOP LEVEL
// =============================================================================

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Alert(#[from] AlertError),

    #[error(transparent)]
    Price(#[from] PriceError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Service error: {0}")]
    Service(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    /// Errors that only skip the current tick or message
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, BotError::Config(_) | BotError::Io(_))
    }
}
