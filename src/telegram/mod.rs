//! Telegram front end for BlinckyBot
//!
//! # Architecture
//!
//! ```text
//! telegram/
//! ├── mod.rs           # This file - public API
//! ├── bot.rs           # Bot creation, token check, outbound transport
//! ├── polling.rs       # getUpdates long-polling loop
//! ├── service.rs       # ServiceManager integration
//! │
//! ├── router.rs        # Owner check, command vs. relay dispatch
//! ├── relay.rs         # LLM answers for plain-text messages
//! ├── formatters.rs    # Plain-text reply formatters
//! │
//! └── commands/
//!     ├── parser.rs    # Message text -> Command
//!     └── handlers.rs  # Command -> tracker action + reply
//! ```
//!
//! Everything except `bot`, `polling` and `service` is independent of
//! teloxide and builds without the `telegram` feature.

pub mod commands;
pub mod formatters;
pub mod relay;
pub mod router;

#[cfg(feature = "telegram")]
pub mod bot;
#[cfg(feature = "telegram")]
pub mod polling;
#[cfg(feature = "telegram")]
pub mod service;

pub use commands::{parse_command, Command, CommandHandler};
pub use relay::LlmRelay;
pub use router::{MessageRouter, Routed};

#[cfg(feature = "telegram")]
pub use bot::{create_bot, verify_bot, TelegramTransport};
#[cfg(feature = "telegram")]
pub use service::TelegramService;
