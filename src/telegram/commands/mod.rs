//! Bot commands
//!
//! `parser` turns message text into a `Command`; `handlers` runs it against
//! the tracker and produces the reply text.

pub mod handlers;
pub mod parser;

pub use handlers::CommandHandler;
pub use parser::{parse_command, parse_price, Command};
