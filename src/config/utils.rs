//! Configuration utilities: loading, environment overrides and validation.
//!
//! Precedence, lowest first: schema defaults, TOML file, `.env` file,
//! process environment.

use super::schemas::Config;
use crate::logger::{self, LogTag};
use std::path::Path;

/// Environment variables read on top of the file
pub const ENV_OVERRIDES: &[&str] = &[
    "TELEGRAM_BOT_TOKEN",
    "OWNER_ID",
    "CHECK_INTERVAL_SEC",
    "PRICE_PROVIDER",
    "TWELVEDATA_API_KEY",
    "LLM_API_KEY",
    "OPENAI_API_KEY",
    "LLM_MODEL",
    "LLM_BASE_URL",
];

/// Parse a TOML document into a `Config`
pub fn parse_config(contents: &str) -> Result<Config, String> {
    toml::from_str::<Config>(contents).map_err(|e| format!("Failed to parse config: {}", e))
}

/// Read `path`, or return defaults when the file does not exist
pub fn read_config_file(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path.display()),
        );
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

    for key in unknown_keys(&contents) {
        logger::warning(LogTag::Config, &format!("Ignoring unknown config key '{}'", key));
    }

    parse_config(&contents).map_err(|e| format!("{} ({})", e, path.display()))
}

/// Keys present in the document that no schema declares
pub fn unknown_keys(contents: &str) -> Vec<String> {
    let Ok(root) = toml::from_str::<toml::Table>(contents) else {
        return Vec::new();
    };

    let mut unknown = Vec::new();
    for (section, value) in &root {
        match (Config::section_fields(section), value) {
            (Some(fields), toml::Value::Table(table)) => {
                for key in table.keys() {
                    if !fields.contains(&key.as_str()) {
                        unknown.push(format!("{}.{}", section, key));
                    }
                }
            }
            (Some(_), _) => {}
            (None, _) => unknown.push(section.clone()),
        }
    }
    unknown.sort();
    unknown
}

/// Apply environment overrides through `lookup`; returns the variables used.
///
/// Empty values are ignored. Unparsable numbers are reported as errors
/// rather than silently dropped.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<Vec<&'static str>, String>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let mut applied = Vec::new();

    if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
        config.telegram.bot_token = token;
        applied.push("TELEGRAM_BOT_TOKEN");
    }
    if let Some(owner) = get("OWNER_ID") {
        config.telegram.owner_id = owner
            .parse::<i64>()
            .map_err(|_| format!("OWNER_ID must be a numeric chat id, got '{}'", owner))?;
        applied.push("OWNER_ID");
    }
    if let Some(interval) = get("CHECK_INTERVAL_SEC") {
        config.tracker.check_interval_secs = interval
            .parse::<u64>()
            .map_err(|_| format!("CHECK_INTERVAL_SEC must be a whole number of seconds, got '{}'", interval))?;
        applied.push("CHECK_INTERVAL_SEC");
    }
    if let Some(provider) = get("PRICE_PROVIDER") {
        config.price.provider = provider;
        applied.push("PRICE_PROVIDER");
    }
    if let Some(key) = get("TWELVEDATA_API_KEY") {
        config.price.api_key = key;
        applied.push("TWELVEDATA_API_KEY");
    }
    if let Some(key) = get("LLM_API_KEY") {
        config.llm.api_key = key;
        applied.push("LLM_API_KEY");
    } else if let Some(key) = get("OPENAI_API_KEY") {
        config.llm.api_key = key;
        applied.push("OPENAI_API_KEY");
    }
    if let Some(model) = get("LLM_MODEL") {
        config.llm.model = model;
        applied.push("LLM_MODEL");
    }
    if let Some(url) = get("LLM_BASE_URL") {
        config.llm.base_url = url;
        applied.push("LLM_BASE_URL");
    }

    // A key in the environment is an opt-in to the relay
    if applied.iter().any(|v| *v == "LLM_API_KEY" || *v == "OPENAI_API_KEY") {
        config.llm.enabled = true;
    }

    Ok(applied)
}

/// Check the loaded configuration; all problems are reported at once
pub fn validate_config(config: &Config) -> Result<(), String> {
    let mut errors = Vec::new();

    if config.telegram.enabled {
        if config.telegram.bot_token.trim().is_empty() {
            errors.push("telegram.bot_token is required (or TELEGRAM_BOT_TOKEN)".to_string());
        }
        if config.telegram.owner_id == 0 {
            errors.push("telegram.owner_id is required (or OWNER_ID)".to_string());
        }
    }

    if config.tracker.check_interval_secs == 0 {
        errors.push("tracker.check_interval_secs must be greater than 0".to_string());
    }
    if config.tracker.cooldown_ms < 0 {
        errors.push("tracker.cooldown_ms must not be negative".to_string());
    }
    if config.tracker.default_metal.parse::<crate::pricing::Metal>().is_err() {
        errors.push(format!(
            "tracker.default_metal '{}' is not a known metal",
            config.tracker.default_metal
        ));
    }

    let provider = crate::pricing::normalize_provider(&config.price.provider);
    if provider.is_none() {
        errors.push(format!(
            "price.provider '{}' is not one of {:?}",
            config.price.provider,
            crate::pricing::PROVIDERS
        ));
    }
    if provider == Some("twelvedata") && config.price.api_key.trim().is_empty() {
        errors.push("price.api_key is required for twelvedata (or TWELVEDATA_API_KEY)".to_string());
    }

    if config.llm.enabled {
        match config.llm.provider.parse::<crate::apis::llm::Provider>() {
            Ok(p) if p.requires_api_key() && config.llm.api_key.trim().is_empty() => {
                errors.push("llm.api_key is required when llm.enabled (or LLM_API_KEY)".to_string());
            }
            Ok(_) => {}
            Err(e) => errors.push(format!("llm.provider: {}", e)),
        }
        if !(0.0..=2.0).contains(&config.llm.temperature) {
            errors.push("llm.temperature must be between 0.0 and 2.0".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

/// Load `.env`, the config file and environment overrides, validate, and
/// install the result as the global configuration.
pub fn load_config(path: &Path) -> Result<Config, String> {
    #[cfg(feature = "logging")]
    {
        if let Ok(env_path) = dotenv::dotenv() {
            logger::debug(LogTag::Config, &format!("Loaded {}", env_path.display()));
        }
    }

    let mut config = read_config_file(path)?;
    let applied = apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    if !applied.is_empty() {
        logger::info(
            LogTag::Config,
            &format!("Environment overrides: {}", applied.join(", ")),
        );
    }

    validate_config(&config)?;
    Ok(config)
}
