/// Yahoo Finance chart client
///
/// Uses the front-month futures contract (`SI=F`, `GC=F`, ...) as the spot
/// proxy: `GET /v8/finance/chart/<symbol>` and reads
/// `chart.result[0].meta.regularMarketPrice`.
use crate::apis::client::HttpClient;
use crate::errors::PriceError;
use crate::logger::{self, LogTag};
use crate::pricing::{validate_quote, Metal, PriceSource};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const PROVIDER: &str = "yahoo";

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: Option<String>,
    pub currency: Option<String>,
    pub regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

pub struct YahooFinanceClient {
    http_client: HttpClient,
}

impl YahooFinanceClient {
    pub fn new(timeout: Duration) -> Result<Self, PriceError> {
        let http_client = HttpClient::new(timeout).map_err(|e| PriceError::upstream(PROVIDER, e))?;
        Ok(Self { http_client })
    }
}

pub fn parse_chart(response: ChartResponse, metal: Metal) -> Result<f64, PriceError> {
    if let Some(err) = response.chart.error {
        return Err(PriceError::upstream(
            PROVIDER,
            format!("{}: {}", err.code, err.description),
        ));
    }

    let price = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .and_then(|r| r.meta.regular_market_price)
        .ok_or_else(|| PriceError::malformed(PROVIDER, "missing regularMarketPrice"))?;

    validate_quote(PROVIDER, metal, price)
}

#[async_trait]
impl PriceSource for YahooFinanceClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch(&self, metal: Metal) -> Result<f64, PriceError> {
        let url = format!("{}/{}?interval=1m&range=1d", YAHOO_BASE_URL, metal.futures_symbol());
        let response: ChartResponse = self.http_client.get_json(PROVIDER, &url).await?;
        let price = parse_chart(response, metal)?;

        logger::debug(
            LogTag::Price,
            &format!("{} {} = {:.4}", PROVIDER, metal.futures_symbol(), price),
        );
        Ok(price)
    }
}
