/// Log tags identifying the subsystem a message comes from
///
/// Every tag maps to a `--debug-<key>` flag that enables DEBUG output for it.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Telegram,
    Commands,
    Tracker,
    Alerts,
    Price,
    Llm,
    Test,
    Other(String),
}

impl LogTag {
    /// Key used by `--debug-<key>` / `--verbose-<key>` flags
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Telegram => "telegram".to_string(),
            LogTag::Commands => "commands".to_string(),
            LogTag::Tracker => "tracker".to_string(),
            LogTag::Alerts => "alerts".to_string(),
            LogTag::Price => "price".to_string(),
            LogTag::Llm => "llm".to_string(),
            LogTag::Test => "test".to_string(),
            LogTag::Other(name) => name.to_lowercase(),
        }
    }

    /// Uncolored label written to log files
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::Other(name) => name.to_uppercase(),
            other => other.to_debug_key().to_uppercase(),
        }
    }

    /// All built-in tags, used to render the help text
    pub fn all() -> Vec<LogTag> {
        vec![
            LogTag::System,
            LogTag::Config,
            LogTag::Telegram,
            LogTag::Commands,
            LogTag::Tracker,
            LogTag::Alerts,
            LogTag::Price,
            LogTag::Llm,
        ]
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
