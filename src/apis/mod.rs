/// External HTTP APIs: spot price providers and LLM chat completions
pub mod client;
pub mod llm;
pub mod metals_live;
pub mod twelvedata;
pub mod yahoo;

pub use client::{HttpClient, RateLimiter};
pub use metals_live::MetalsLiveClient;
pub use twelvedata::TwelveDataClient;
pub use yahoo::YahooFinanceClient;
