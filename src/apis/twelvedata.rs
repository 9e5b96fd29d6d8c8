/// TwelveData price client
///
/// API Documentation: https://twelvedata.com/docs#price
///
/// `GET /price?symbol=XAG/USD&apikey=...` returns `{"price":"24.33"}`.
/// Failures come back with HTTP 200 and a `{"code":..,"message":..}` body.
use crate::apis::client::{HttpClient, RateLimiter};
use crate::errors::PriceError;
use crate::logger::{self, LogTag};
use crate::pricing::{validate_quote, Metal, PriceSource};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const TWELVEDATA_BASE_URL: &str = "https://api.twelvedata.com";
pub const PROVIDER: &str = "twelvedata";

/// Free tier allows 8 requests per minute
pub const RATE_LIMIT_PER_MINUTE: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PriceResponse {
    Quote { price: String },
    Error { code: i64, message: String },
}

pub struct TwelveDataClient {
    http_client: HttpClient,
    rate_limiter: RateLimiter,
    api_key: String,
    base_url: String,
}

impl TwelveDataClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, PriceError> {
        let http_client = HttpClient::new(timeout).map_err(|e| PriceError::upstream(PROVIDER, e))?;
        Ok(Self {
            http_client,
            rate_limiter: RateLimiter::new(RATE_LIMIT_PER_MINUTE),
            api_key,
            base_url: TWELVEDATA_BASE_URL.to_string(),
        })
    }

    pub fn symbol(metal: Metal) -> String {
        format!("{}/USD", metal.iso_code())
    }
}

pub fn parse_price(response: PriceResponse, metal: Metal) -> Result<f64, PriceError> {
    match response {
        PriceResponse::Quote { price } => {
            let value = price
                .trim()
                .parse::<f64>()
                .map_err(|_| PriceError::malformed(PROVIDER, format!("not a number: '{}'", price)))?;
            validate_quote(PROVIDER, metal, value)
        }
        PriceResponse::Error { code, message } if code == 401 || code == 403 => {
            Err(PriceError::upstream(PROVIDER, format!("auth rejected ({}): {}", code, message)))
        }
        PriceResponse::Error { code, message } if code == 400 || code == 404 => {
            Err(PriceError::UnsupportedInstrument {
                provider: PROVIDER.to_string(),
                instrument: format!("{} ({})", TwelveDataClient::symbol(metal), message),
            })
        }
        PriceResponse::Error { code, message } => {
            Err(PriceError::upstream(PROVIDER, format!("code {}: {}", code, message)))
        }
    }
}

#[async_trait]
impl PriceSource for TwelveDataClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch(&self, metal: Metal) -> Result<f64, PriceError> {
        let _guard = self
            .rate_limiter
            .acquire()
            .await
            .map_err(|e| PriceError::upstream(PROVIDER, e))?;

        let url = format!(
            "{}/price?symbol={}&apikey={}",
            self.base_url,
            Self::symbol(metal),
            self.api_key
        );
        let response: PriceResponse = self.http_client.get_json(PROVIDER, &url).await?;
        let price = parse_price(response, metal)?;

        logger::debug(
            LogTag::Price,
            &format!("{} {} = {:.4}", PROVIDER, Self::symbol(metal), price),
        );
        Ok(price)
    }
}
