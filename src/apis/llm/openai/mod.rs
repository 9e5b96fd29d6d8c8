/// OpenAI-compatible chat completions client (raw HTTP via reqwest)
///
/// Works against api.openai.com and any gateway that speaks the same
/// protocol (OpenRouter, Groq, DeepSeek, Together, a local Ollama).
///
/// Endpoint: POST {base_url}/chat/completions with Bearer authentication.
pub mod types;

pub use self::types::{
    OpenAiChoice, OpenAiErrorBody, OpenAiMessage, OpenAiRequest, OpenAiResponse, OpenAiUsage,
};

use crate::apis::client::RateLimiter;
use crate::apis::llm::{ChatRequest, ChatResponse, LlmClient, LlmError, Provider, Usage};
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

// ============================================================================
// API CONFIGURATION
// ============================================================================

const ENDPOINT_CHAT: &str = "/chat/completions";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RATE_LIMIT_PER_MINUTE: usize = 20;

// ============================================================================
// CLIENT IMPLEMENTATION
// ============================================================================

pub struct OpenAiCompatibleClient {
    provider: Provider,
    api_key: String,
    base_url: String,
    client: Client,
    model: String,
    timeout: Duration,
    rate_limiter: RateLimiter,
    enabled: bool,
}

impl OpenAiCompatibleClient {
    /// Create a client for `provider`.
    ///
    /// `model` falls back to the provider default. An empty key is only
    /// accepted for providers that do not require one.
    pub fn new(
        provider: Provider,
        api_key: String,
        model: Option<String>,
        enabled: bool,
    ) -> Result<Self, String> {
        if provider.requires_api_key() && api_key.trim().is_empty() {
            return Err(format!("{} API key cannot be empty", provider));
        }

        Ok(Self {
            provider,
            api_key: api_key.trim().to_string(),
            base_url: provider.default_base_url().to_string(),
            client: Client::new(),
            model: model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| provider.default_model().to_string()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            rate_limiter: RateLimiter::new(DEFAULT_RATE_LIMIT_PER_MINUTE),
            enabled,
        })
    }

    /// Point the client at a different OpenAI-compatible server
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            self.base_url = trimmed.to_string();
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_rate_limit(mut self, max_per_minute: usize) -> Self {
        self.rate_limiter = RateLimiter::new(max_per_minute);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, ENDPOINT_CHAT)
    }

    fn build_openai_request(&self, request: ChatRequest) -> OpenAiRequest {
        let messages = request
            .messages
            .into_iter()
            .map(|msg| OpenAiMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content,
            })
            .collect();

        OpenAiRequest {
            model: if request.model.is_empty() {
                self.model.clone()
            } else {
                request.model
            },
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    fn parse_openai_response(&self, response: OpenAiResponse, latency_ms: f64) -> Result<ChatResponse, LlmError> {
        let choice = response.choices.first().ok_or_else(|| LlmError::InvalidResponse {
            provider: self.provider.id().to_string(),
            message: "No choices in response".to_string(),
        })?;

        let content = choice
            .message
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: self.provider.id().to_string(),
                message: "Empty completion".to_string(),
            })?;

        let usage = response
            .usage
            .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(ChatResponse::new(
            content,
            usage,
            choice.finish_reason.clone().unwrap_or_else(|| "stop".to_string()),
            response.model,
            latency_ms,
        ))
    }

    /// Map a non-success status to an error; `retry_after_secs` comes from the header
    fn map_status_error(&self, status: u16, retry_after_secs: Option<u64>, body: &str) -> LlmError {
        let provider = self.provider.id().to_string();
        let message = serde_json::from_str::<OpenAiErrorBody>(body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| body.chars().take(300).collect());

        match status {
            401 | 403 => LlmError::AuthError { provider, message },
            429 => LlmError::RateLimited {
                provider,
                retry_after_ms: retry_after_secs.map(|s| s * 1000),
            },
            _ => LlmError::ApiError {
                provider,
                status_code: status,
                message,
            },
        }
    }

    async fn execute_request(&self, request: OpenAiRequest) -> Result<(OpenAiResponse, f64), LlmError> {
        if !self.enabled {
            return Err(LlmError::ProviderDisabled {
                provider: self.provider.id().to_string(),
            });
        }

        let guard = self
            .rate_limiter
            .acquire()
            .await
            .map_err(|e| LlmError::NetworkError {
                provider: self.provider.id().to_string(),
                message: format!("Rate limiter error: {}", e),
            })?;

        logger::debug(
            LogTag::Llm,
            &format!(
                "[{}] Calling chat completions: model={} messages={}",
                self.provider.id().to_uppercase(),
                request.model,
                request.messages.len()
            ),
        );

        let start = Instant::now();
        let mut builder = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(&request)
            .timeout(self.timeout);
        if !self.api_key.is_empty() {
            builder = builder.header("Authorization", format!("Bearer {}", self.api_key));
        }
        let response_result = builder.send().await;

        drop(guard);
        let elapsed = start.elapsed().as_millis() as f64;

        let response = response_result.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout {
                    provider: self.provider.id().to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                }
            } else {
                LlmError::NetworkError {
                    provider: self.provider.id().to_string(),
                    message: format!("Request failed: {}", e),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            // Header must be read before the body consumes the response
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            let error_body = response.text().await.unwrap_or_default();
            return Err(self.map_status_error(status.as_u16(), retry_after, &error_body));
        }

        let parsed = response
            .json::<OpenAiResponse>()
            .await
            .map_err(|e| LlmError::ParseError {
                provider: self.provider.id().to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok((parsed, elapsed))
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn call(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let openai_request = self.build_openai_request(request);
        let (response, latency_ms) = self.execute_request(openai_request).await?;
        let parsed = self.parse_openai_response(response, latency_ms)?;

        logger::debug(
            LogTag::Llm,
            &format!(
                "Completion from {}: {} tokens in {:.0}ms ({})",
                parsed.model, parsed.usage.total_tokens, parsed.latency_ms, parsed.finish_reason
            ),
        );
        Ok(parsed)
    }

    fn rate_limit_info(&self) -> (usize, Duration) {
        (
            self.rate_limiter.max_per_minute(),
            self.rate_limiter.min_interval(),
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
