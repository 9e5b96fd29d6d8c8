/// TTL cache in front of a price source
///
/// Lets the tracker tick faster than the upstream fetch cadence. Only
/// successful quotes are stored; an error is returned to the caller and the
/// previous entry keeps its original expiry.
use super::{Metal, PriceSource};
use crate::errors::PriceError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy)]
struct CachedQuote {
    price: f64,
    cached_at: Instant,
}

pub struct CachedPriceSource {
    inner: Arc<dyn PriceSource>,
    ttl: Duration,
    quotes: RwLock<HashMap<Metal, CachedQuote>>,
    name: String,
}

impl CachedPriceSource {
    pub fn new(inner: Arc<dyn PriceSource>, ttl: Duration) -> Self {
        let name = format!("{} (cached)", inner.name());
        Self {
            inner,
            ttl,
            quotes: RwLock::new(HashMap::new()),
            name,
        }
    }

    async fn fresh(&self, metal: Metal) -> Option<f64> {
        let quotes = self.quotes.read().await;
        quotes
            .get(&metal)
            .filter(|q| q.cached_at.elapsed() < self.ttl)
            .map(|q| q.price)
    }
}

#[async_trait]
impl PriceSource for CachedPriceSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, metal: Metal) -> Result<f64, PriceError> {
        if let Some(price) = self.fresh(metal).await {
            logger::verbose(
                LogTag::Price,
                &format!("Cache hit for {}: {:.4}", metal.as_str(), price),
            );
            return Ok(price);
        }

        let price = self.inner.fetch(metal).await?;
        self.quotes.write().await.insert(
            metal,
            CachedQuote {
                price,
                cached_at: Instant::now(),
            },
        );
        Ok(price)
    }
}
