/// metals.live spot price client
///
/// Free, keyless endpoint: `GET /v1/spot/<metal>` returns a list of
/// single-key objects, e.g. `[{"silver": 24.33}]`.
use crate::apis::client::HttpClient;
use crate::errors::PriceError;
use crate::logger::{self, LogTag};
use crate::pricing::{validate_quote, Metal, PriceSource};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

const METALS_LIVE_BASE_URL: &str = "https://api.metals.live/v1/spot";
pub const PROVIDER: &str = "metals.live";

pub struct MetalsLiveClient {
    http_client: HttpClient,
    base_url: String,
}

impl MetalsLiveClient {
    pub fn new(timeout: Duration) -> Result<Self, PriceError> {
        Self::with_base_url(METALS_LIVE_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, PriceError> {
        let http_client = HttpClient::new(timeout).map_err(|e| PriceError::upstream(PROVIDER, e))?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Extract the quote for `metal` from a metals.live body.
///
/// The first element carrying the metal's key wins. Numbers given as
/// strings are accepted.
pub fn parse_spot(body: &Value, metal: Metal) -> Result<f64, PriceError> {
    let entries = body
        .as_array()
        .ok_or_else(|| PriceError::malformed(PROVIDER, "expected a JSON array"))?;

    let raw = entries
        .iter()
        .find_map(|entry| entry.get(metal.as_str()))
        .ok_or_else(|| PriceError::malformed(PROVIDER, format!("no '{}' field", metal.as_str())))?;

    let price = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| PriceError::malformed(PROVIDER, format!("not a number: {}", raw)))?;

    validate_quote(PROVIDER, metal, price)
}

#[async_trait]
impl PriceSource for MetalsLiveClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch(&self, metal: Metal) -> Result<f64, PriceError> {
        let url = format!("{}/{}", self.base_url, metal.as_str());
        let body: Value = self.http_client.get_json(PROVIDER, &url).await?;
        let price = parse_spot(&body, metal)?;

        logger::debug(
            LogTag::Price,
            &format!("{} {} = {:.4}", PROVIDER, metal.as_str(), price),
        );
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_spot_number() {
        let body = json!([{ "silver": 24.33 }]);
        assert_eq!(parse_spot(&body, Metal::Silver), Ok(24.33));
    }

    #[test]
    fn test_parse_spot_string_and_later_entry() {
        let body = json!([{ "timestamp": 1700000000 }, { "gold": "2401.5" }]);
        assert_eq!(parse_spot(&body, Metal::Gold), Ok(2401.5));
    }

    #[test]
    fn test_parse_spot_missing_metal() {
        let body = json!([{ "gold": 2400.0 }]);
        assert!(matches!(
            parse_spot(&body, Metal::Silver),
            Err(PriceError::MalformedQuote { .. })
        ));
    }

    #[test]
    fn test_parse_spot_rejects_bad_shapes() {
        assert!(parse_spot(&json!({ "silver": 24.0 }), Metal::Silver).is_err());
        assert!(parse_spot(&json!([{ "silver": null }]), Metal::Silver).is_err());
        assert!(parse_spot(&json!([{ "silver": 0 }]), Metal::Silver).is_err());
        assert!(parse_spot(&json!([]), Metal::Silver).is_err());
    }
}
