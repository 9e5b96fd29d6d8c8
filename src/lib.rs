pub mod alerts; // Threshold crossing state machine
pub mod apis;
pub mod arguments;
pub mod config;
pub mod errors;
pub mod logger;
pub mod notifications;
pub mod paths;
pub mod pricing;
pub mod run;
pub mod services;
pub mod telegram;
pub mod tracker;

#[cfg(test)]
pub(crate) mod test_support;
