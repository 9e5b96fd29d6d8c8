/// Spot metal price sources
///
/// Every provider implements `PriceSource`; the tracker only ever talks to
/// the trait object, so switching providers or wrapping one in the TTL
/// cache never touches the alert core.
use crate::apis::{MetalsLiveClient, TwelveDataClient, YahooFinanceClient};
use crate::config::PriceConfig;
use crate::errors::PriceError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub mod cache;
pub mod metal;

pub use cache::CachedPriceSource;
pub use metal::Metal;

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Provider name used in logs and errors
    fn name(&self) -> &str;

    /// Latest quote for `metal` in USD per troy ounce
    async fn fetch(&self, metal: Metal) -> Result<f64, PriceError>;
}

/// Reject quotes no provider should ever return
pub fn validate_quote(provider: &str, metal: Metal, price: f64) -> Result<f64, PriceError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(PriceError::malformed(
            provider,
            format!("{} quote out of range: {}", metal.as_str(), price),
        ));
    }
    Ok(price)
}

/// Known provider identifiers for `price.provider`
pub const PROVIDERS: [&str; 3] = ["metals_live", "twelvedata", "yahoo"];

/// Canonical provider id for a configured name, accepting common spellings
pub fn normalize_provider(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().as_str() {
        "metals_live" | "metals.live" | "metalslive" => Some("metals_live"),
        "twelvedata" | "twelve_data" => Some("twelvedata"),
        "yahoo" | "yahoo_finance" => Some("yahoo"),
        _ => None,
    }
}

/// Build the configured price source, wrapped in the cache when a TTL is set
pub fn create_price_source(config: &PriceConfig) -> Result<Arc<dyn PriceSource>, PriceError> {
    let timeout = Duration::from_secs(config.timeout_secs.max(1));

    let source: Arc<dyn PriceSource> = match normalize_provider(&config.provider) {
        Some("metals_live") => Arc::new(MetalsLiveClient::new(timeout)?),
        Some("twelvedata") => {
            if config.api_key.trim().is_empty() {
                return Err(PriceError::MissingApiKey {
                    provider: "twelvedata".to_string(),
                });
            }
            Arc::new(TwelveDataClient::new(config.api_key.trim().to_string(), timeout)?)
        }
        Some("yahoo") => Arc::new(YahooFinanceClient::new(timeout)?),
        _ => return Err(PriceError::UnknownProvider(config.provider.trim().to_string())),
    };

    logger::info(
        LogTag::Price,
        &format!(
            "Price source: {} (cache ttl {}s)",
            source.name(),
            config.cache_ttl_secs
        ),
    );

    if config.cache_ttl_secs == 0 {
        return Ok(source);
    }

    Ok(Arc::new(CachedPriceSource::new(
        source,
        Duration::from_secs(config.cache_ttl_secs),
    )))
}
