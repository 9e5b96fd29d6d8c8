/// Core LLM API types
///
/// Provider-neutral request/response types. Each provider module converts
/// these to and from its wire format.
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// MESSAGE TYPES
// ============================================================================

/// Chat message with role and content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Message role in a chat conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// REQUEST TYPES
// ============================================================================

/// Chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier; empty means "use the client's default"
    pub model: String,

    pub messages: Vec<ChatMessage>,

    /// Temperature (0.0-2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

// ============================================================================
// RESPONSE TYPES
// ============================================================================

/// Chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated text content
    pub content: String,

    pub usage: Usage,

    /// Reason for completion finish
    pub finish_reason: String,

    /// Model used for generation
    pub model: String,

    pub latency_ms: f64,
}

impl ChatResponse {
    pub fn new(
        content: impl Into<String>,
        usage: Usage,
        finish_reason: impl Into<String>,
        model: impl Into<String>,
        latency_ms: f64,
    ) -> Self {
        Self {
            content: content.into(),
            usage,
            finish_reason: finish_reason.into(),
            model: model.into(),
            latency_ms,
        }
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// LLM API errors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LlmError {
    /// Rate limited by provider
    RateLimited {
        provider: String,
        retry_after_ms: Option<u64>,
    },

    Timeout { provider: String, timeout_ms: u64 },

    /// Response decoded but unusable (no choices, empty content)
    InvalidResponse { provider: String, message: String },

    AuthError { provider: String, message: String },

    NetworkError { provider: String, message: String },

    ParseError { provider: String, message: String },

    /// Any other non-success HTTP status
    ApiError {
        provider: String,
        status_code: u16,
        message: String,
    },

    /// Relay switched off or no API key configured
    ProviderDisabled { provider: String },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::RateLimited {
                provider,
                retry_after_ms,
            } => {
                if let Some(ms) = retry_after_ms {
                    write!(f, "[{}] Rate limited (retry after {}ms)", provider, ms)
                } else {
                    write!(f, "[{}] Rate limited", provider)
                }
            }
            LlmError::Timeout {
                provider,
                timeout_ms,
            } => {
                write!(f, "[{}] Request timeout ({}ms)", provider, timeout_ms)
            }
            LlmError::InvalidResponse { provider, message } => {
                write!(f, "[{}] Invalid response: {}", provider, message)
            }
            LlmError::AuthError { provider, message } => {
                write!(f, "[{}] Auth error: {}", provider, message)
            }
            LlmError::NetworkError { provider, message } => {
                write!(f, "[{}] Network error: {}", provider, message)
            }
            LlmError::ParseError { provider, message } => {
                write!(f, "[{}] Parse error: {}", provider, message)
            }
            LlmError::ApiError {
                provider,
                status_code,
                message,
            } => {
                write!(f, "[{}] API error {}: {}", provider, status_code, message)
            }
            LlmError::ProviderDisabled { provider } => {
                write!(f, "[{}] Provider disabled in config", provider)
            }
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    /// Short user-facing explanation for a relay failure
    pub fn user_message(&self) -> &'static str {
        match self {
            LlmError::RateLimited { .. } => "The assistant is rate limited right now, try again in a minute.",
            LlmError::Timeout { .. } => "The assistant took too long to answer.",
            LlmError::AuthError { .. } => "The assistant API key was rejected.",
            LlmError::ProviderDisabled { .. } => "The assistant is not configured.",
            _ => "The assistant is unavailable right now.",
        }
    }
}
