/// LLM chat-completion clients
///
/// Only OpenAI-compatible endpoints are supported. `Provider` picks the
/// default base URL; `llm.base_url` overrides it for self-hosted gateways.
pub mod openai;
pub mod types;

pub use self::openai::OpenAiCompatibleClient;
pub use self::types::{ChatMessage, ChatRequest, ChatResponse, LlmError, MessageRole, Usage};

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    OpenRouter,
    Groq,
    DeepSeek,
    Together,
    Ollama,
}

impl Provider {
    pub fn id(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::OpenRouter => "openrouter",
            Provider::Groq => "groq",
            Provider::DeepSeek => "deepseek",
            Provider::Together => "together",
            Provider::Ollama => "ollama",
        }
    }

    /// Base URL that `/chat/completions` is appended to
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::DeepSeek => "https://api.deepseek.com",
            Provider::Together => "https://api.together.xyz/v1",
            Provider::Ollama => "http://localhost:11434/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o-mini",
            Provider::OpenRouter => "openai/gpt-4o-mini",
            Provider::Groq => "llama-3.1-8b-instant",
            Provider::DeepSeek => "deepseek-chat",
            Provider::Together => "meta-llama/Llama-3.3-70B-Instruct-Turbo",
            Provider::Ollama => "llama3.1",
        }
    }

    /// Local servers accept requests without a key
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Provider::Ollama)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "openrouter" => Ok(Provider::OpenRouter),
            "groq" => Ok(Provider::Groq),
            "deepseek" => Ok(Provider::DeepSeek),
            "together" => Ok(Provider::Together),
            "ollama" => Ok(Provider::Ollama),
            other => Err(format!("unknown LLM provider '{}'", other)),
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    fn is_enabled(&self) -> bool;

    async fn call(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;

    /// (max requests per minute, minimum spacing between requests)
    fn rate_limit_info(&self) -> (usize, Duration);
}
