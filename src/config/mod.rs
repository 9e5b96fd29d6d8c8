/// Configuration system
///
/// - `macros`: `config_struct!` for declaring sections with defaults
/// - `schemas`: the sections themselves
/// - `utils`: loading, environment overrides, validation
pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{Config, LlmConfig, PriceConfig, TelegramConfig, TrackerConfig, DEFAULT_SYSTEM_PROMPT};
pub use utils::{
    apply_env_overrides, load_config, parse_config, read_config_file, unknown_keys, validate_config,
    ENV_OVERRIDES,
};
