/// Base HTTP client with rate limiting
use crate::errors::PriceError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

const USER_AGENT: &str = concat!("blinckybot/", env!("CARGO_PKG_VERSION"));

/// Rate limiter for API clients
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    last_request: Arc<Mutex<Option<Instant>>>,
    min_interval: Duration,
    max_per_minute: usize,
}

impl RateLimiter {
    pub fn new(max_per_minute: usize) -> Self {
        let min_interval = if max_per_minute > 0 {
            Duration::from_secs_f64(60.0 / max_per_minute as f64)
        } else {
            Duration::ZERO
        };

        Self {
            semaphore: Arc::new(Semaphore::new(1)), // Only 1 concurrent request
            last_request: Arc::new(Mutex::new(None)),
            min_interval,
            max_per_minute,
        }
    }

    /// Wait until a request may start; the guard keeps the slot until dropped
    pub async fn acquire(&self) -> Result<RateLimitGuard, String> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| format!("Failed to acquire rate limiter permit: {}", e))?;

        if !self.min_interval.is_zero() {
            let mut last = self.last_request.lock().await;
            if let Some(last_time) = *last {
                let elapsed = last_time.elapsed();
                if elapsed < self.min_interval {
                    tokio::time::sleep(self.min_interval - elapsed).await;
                }
            }
            *last = Some(Instant::now());
        }

        Ok(RateLimitGuard { _permit: permit })
    }

    pub fn max_per_minute(&self) -> usize {
        self.max_per_minute
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// RAII guard returned by [`RateLimiter::acquire`]
pub struct RateLimitGuard {
    _permit: OwnedSemaphorePermit,
}

/// HTTP client wrapper with a fixed timeout
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, timeout })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` and decode the JSON body, mapping failures to `PriceError`
    pub async fn get_json<T: DeserializeOwned>(&self, provider: &str, url: &str) -> Result<T, PriceError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| PriceError::upstream(provider, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PriceError::upstream(provider, format!("HTTP {}", status)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| PriceError::malformed(provider, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_interval() {
        let limiter = RateLimiter::new(30);
        assert_eq!(limiter.min_interval(), Duration::from_secs(2));
        assert_eq!(RateLimiter::new(0).min_interval(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_rate_limiter_serializes_requests() {
        let limiter = Arc::new(RateLimiter::new(0));
        let guard = limiter.acquire().await.unwrap();

        let other = limiter.clone();
        let waiter = tokio::spawn(async move { other.acquire().await.map(|_| ()) });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        assert!(waiter.await.unwrap().is_ok());
    }
}
