/// OpenAI Chat Completions wire types
///
/// API Documentation: https://platform.openai.com/docs/api-reference/chat/create
///
/// Response fields that compatible gateways often omit are optional.
use serde::{Deserialize, Serialize};

// ============================================================================
// REQUEST TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct OpenAiRequest {
    pub model: String,

    pub messages: Vec<OpenAiMessage>,

    /// Sampling temperature (0.0-2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenAiMessage {
    /// "system", "user" or "assistant"
    pub role: String,
    pub content: String,
}

// ============================================================================
// RESPONSE TYPES
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiResponse {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub model: String,

    pub choices: Vec<OpenAiChoice>,

    #[serde(default)]
    pub usage: Option<OpenAiUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiChoice {
    #[serde(default)]
    pub index: u32,

    pub message: OpenAiResponseMessage,

    /// "stop", "length", "content_filter", ...
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiResponseMessage {
    #[serde(default)]
    pub role: String,

    /// Null when the model refused or only produced tool calls
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OpenAiUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Error envelope: `{"error": {"message": "...", "type": "..."}}`
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiErrorBody {
    pub error: OpenAiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
}
