/// Centralized argument handling for BlinckyBot
///
/// Arguments are captured once into `CMD_ARGS`; tests and tools can replace
/// them with `set_cmd_args`.
use crate::logger::LogTag;
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Gets a copy of the current command-line arguments
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        // Poisoned mutex: fall back to the real process arguments
        Err(_) => env::args().collect(),
    }
}

pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Value following `flag`, accepting both `--flag value` and `--flag=value`
pub fn get_arg_value(flag: &str) -> Option<String> {
    value_in(&get_cmd_args(), flag)
}

fn value_in(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{}=", flag);
    for (i, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            return Some(value.to_string());
        }
        if arg == flag {
            return args.get(i + 1).filter(|v| !v.starts_with("--")).cloned();
        }
    }
    None
}

pub mod patterns {
    use super::has_arg;

    pub fn is_help_requested() -> bool {
        has_arg("--help") || has_arg("-h")
    }
}

/// `--check-config`: validate configuration and exit
pub fn is_check_config_enabled() -> bool {
    has_arg("--check-config")
}

/// `--config <path>` override for the configuration file
pub fn get_config_path_override() -> Option<String> {
    get_arg_value("--config")
}

pub fn print_help() {
    println!("BlinckyBot - Telegram spot metal price alerts");
    println!();
    println!("USAGE:");
    println!("    blinckybot [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --config <path>           Use this configuration file");
    println!("    --check-config            Validate configuration and exit");
    println!("    --help, -h                Show this help message");
    println!();
    println!("LOGGING:");
    println!("    --verbose                 Verbose output for every module");
    println!("    --quiet                   Only warnings and errors");
    println!("    --no-log-file             Do not write a log file");
    for tag in LogTag::all() {
        let key = tag.to_debug_key();
        println!("    --debug-{:<18}{} module debug mode", key, tag.to_plain_string());
    }
    println!();
    println!("ENVIRONMENT:");
    println!("    TELEGRAM_BOT_TOKEN, OWNER_ID, CHECK_INTERVAL_SEC, PRICE_PROVIDER,");
    println!("    TWELVEDATA_API_KEY, LLM_API_KEY, LLM_MODEL, LLM_BASE_URL, BLINCKYBOT_HOME");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_value_after_flag() {
        let a = args(&["bot", "--config", "/tmp/c.toml"]);
        assert_eq!(value_in(&a, "--config"), Some("/tmp/c.toml".to_string()));
    }

    #[test]
    fn test_value_with_equals() {
        let a = args(&["bot", "--config=/etc/bot.toml"]);
        assert_eq!(value_in(&a, "--config"), Some("/etc/bot.toml".to_string()));
    }

    #[test]
    fn test_flag_without_value() {
        let a = args(&["bot", "--config", "--verbose"]);
        assert_eq!(value_in(&a, "--config"), None);
        assert_eq!(value_in(&args(&["bot"]), "--config"), None);
    }
}
