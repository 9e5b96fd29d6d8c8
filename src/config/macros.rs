/// Configuration macros for zero-repetition config definitions
///
/// `config_struct!` declares a section once: field name, type and default
/// value side by side.

/// Define a configuration struct with embedded defaults
///
/// Generates:
/// - the struct with public fields
/// - a `Default` impl using the listed values
/// - serde support with `#[serde(default)]`, so partial TOML files load
/// - `FIELDS`, the list of accepted keys, used to warn about typos
///
/// # Example
/// ```ignore
/// config_struct! {
///     pub struct TrackerConfig {
///         check_interval_secs: u64 = 60,
///         default_metal: String = "silver".to_string(),
///     }
/// }
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_name:ident: $field_type:ty = $default_value:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field_name: $field_type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field_name: $default_value,
                    )*
                }
            }
        }

        impl $name {
            /// Keys accepted in this section of the config file
            pub const FIELDS: &'static [&'static str] = &[$(stringify!($field_name)),*];
        }
    };
}
