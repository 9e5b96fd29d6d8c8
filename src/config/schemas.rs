/// Configuration schemas
///
/// Every section is declared with `config_struct!`; a missing file or a
/// missing key falls back to the values below.
use crate::config_struct;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are BlinckyBot, a concise assistant inside a private Telegram chat. \
Answer briefly in plain text. You can discuss precious metals markets but you cannot place trades.";

config_struct! {
    /// Telegram connection and chat behaviour
    pub struct TelegramConfig {
        /// Poll Telegram for updates; when off, alerts only go to the log
        enabled: bool = true,
        /// Bot token from @BotFather
        bot_token: String = String::new(),
        /// The only chat id allowed to talk to the bot (0 = unset)
        owner_id: i64 = 0,
        commands_enabled: bool = true,
        /// Forward non-command text to the LLM
        llm_relay_enabled: bool = true,
        /// Long-poll timeout for getUpdates
        poll_timeout_secs: u32 = 10,
        /// Pause after a failed getUpdates call
        error_backoff_secs: u64 = 5,
    }
}

config_struct! {
    /// Scheduler loop and alert defaults
    pub struct TrackerConfig {
        /// Seconds between two evaluation passes
        check_interval_secs: u64 = 60,
        /// Metal used by commands without a metal prefix
        default_metal: String = "silver".to_string(),
        /// Minimum spacing between two alerts of one persistent watch
        cooldown_ms: i64 = 60_000,
        /// Start with tracking switched on
        enabled_at_start: bool = false,
    }
}

config_struct! {
    /// Spot price provider selection
    pub struct PriceConfig {
        /// metals_live | twelvedata | yahoo
        provider: String = "metals_live".to_string(),
        /// Required by twelvedata
        api_key: String = String::new(),
        timeout_secs: u64 = 10,
        /// Reuse a quote for this many seconds (0 = always fetch)
        cache_ttl_secs: u64 = 0,
    }
}

config_struct! {
    /// OpenAI-compatible chat relay
    pub struct LlmConfig {
        enabled: bool = false,
        /// openai | openrouter | groq | deepseek | together | ollama
        provider: String = "openai".to_string(),
        /// Overrides the provider's default endpoint when set
        base_url: String = String::new(),
        api_key: String = String::new(),
        /// Empty means the provider default
        model: String = String::new(),
        temperature: f32 = 0.7,
        max_tokens: u32 = 800,
        system_prompt: String = DEFAULT_SYSTEM_PROMPT.to_string(),
        timeout_secs: u64 = 30,
        rate_limit_per_minute: usize = 20,
    }
}

config_struct! {
    /// Root configuration
    pub struct Config {
        telegram: TelegramConfig = TelegramConfig::default(),
        tracker: TrackerConfig = TrackerConfig::default(),
        price: PriceConfig = PriceConfig::default(),
        llm: LlmConfig = LlmConfig::default(),
    }
}

impl Config {
    /// Accepted keys of a top-level section
    pub fn section_fields(section: &str) -> Option<&'static [&'static str]> {
        match section {
            "telegram" => Some(TelegramConfig::FIELDS),
            "tracker" => Some(TrackerConfig::FIELDS),
            "price" => Some(PriceConfig::FIELDS),
            "llm" => Some(LlmConfig::FIELDS),
            _ => None,
        }
    }
}
