//! LLM relay for non-command messages
//!
//! Each message is answered on its own: system prompt plus the user text,
//! no conversation history.

use crate::apis::llm::{ChatMessage, ChatRequest, LlmClient, LlmError, OpenAiCompatibleClient, Provider};
use crate::config::{LlmConfig, DEFAULT_SYSTEM_PROMPT};
use crate::logger::{self, LogTag};
use std::sync::Arc;
use std::time::Duration;

pub struct LlmRelay {
    client: Arc<dyn LlmClient>,
    system_prompt: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmRelay {
    pub fn new(client: Arc<dyn LlmClient>, system_prompt: &str, temperature: f32, max_tokens: u32) -> Self {
        let system_prompt = if system_prompt.trim().is_empty() {
            DEFAULT_SYSTEM_PROMPT.to_string()
        } else {
            system_prompt.trim().to_string()
        };
        Self {
            client,
            system_prompt,
            temperature,
            max_tokens,
        }
    }

    /// Build the relay from config; `Ok(None)` when the relay is switched off
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>, String> {
        if !config.enabled {
            return Ok(None);
        }

        let provider: Provider = config.provider.parse()?;
        let model = Some(config.model.clone()).filter(|m| !m.trim().is_empty());
        let client = OpenAiCompatibleClient::new(provider, config.api_key.clone(), model, true)?
            .with_base_url(&config.base_url)
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_rate_limit(config.rate_limit_per_minute);

        let (per_minute, spacing) = client.rate_limit_info();
        logger::info(
            LogTag::Llm,
            &format!(
                "LLM relay enabled: {} via {} (max {}/min, {}ms apart)",
                client.model(),
                client.endpoint(),
                per_minute,
                spacing.as_millis()
            ),
        );

        Ok(Some(Self::new(
            Arc::new(client),
            &config.system_prompt,
            config.temperature,
            config.max_tokens,
        )))
    }

    pub fn provider(&self) -> Provider {
        self.client.provider()
    }

    /// Answer one user message
    pub async fn ask(&self, text: &str) -> Result<String, LlmError> {
        if !self.client.is_enabled() {
            return Err(LlmError::ProviderDisabled {
                provider: self.provider().id().to_string(),
            });
        }

        let request = ChatRequest::new(
            String::new(),
            vec![ChatMessage::system(&self.system_prompt), ChatMessage::user(text)],
        )
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens);

        let response = self.client.call(request).await?;
        logger::debug(
            LogTag::Llm,
            &format!(
                "Relay answered with {} chars in {:.0}ms",
                response.content.chars().count(),
                response.latency_ms
            ),
        );
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::llm::{ChatResponse, Usage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedLlm {
        reply: Result<String, LlmError>,
        enabled: bool,
        seen: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        fn provider(&self) -> Provider {
            Provider::OpenAi
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        async fn call(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
            self.seen.lock().unwrap().push(request);
            self.reply.clone().map(|content| {
                ChatResponse::new(content, Usage::new(10, 5), "stop", "test-model", 12.0)
            })
        }

        fn rate_limit_info(&self) -> (usize, Duration) {
            (20, Duration::from_secs(3))
        }
    }

    fn scripted(reply: Result<String, LlmError>, enabled: bool) -> Arc<ScriptedLlm> {
        Arc::new(ScriptedLlm {
            reply,
            enabled,
            seen: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_ask_sends_system_prompt_and_text() {
        let llm = scripted(Ok("Silver is a metal.".to_string()), true);
        let relay = LlmRelay::new(llm.clone(), "Be brief.", 0.2, 100);

        assert_eq!(relay.ask("what is silver?").await, Ok("Silver is a metal.".to_string()));

        let seen = llm.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0], ChatMessage::system("Be brief."));
        assert_eq!(request.messages[1], ChatMessage::user("what is silver?"));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(100));
    }

    #[tokio::test]
    async fn test_blank_prompt_uses_default() {
        let llm = scripted(Ok("ok".to_string()), true);
        let relay = LlmRelay::new(llm.clone(), "  ", 0.7, 800);
        relay.ask("hi").await.unwrap();
        assert_eq!(llm.seen.lock().unwrap()[0].messages[0].content, DEFAULT_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let err = LlmError::RateLimited {
            provider: "openai".to_string(),
            retry_after_ms: Some(2000),
        };
        let relay = LlmRelay::new(scripted(Err(err.clone()), true), "", 0.7, 800);
        assert_eq!(relay.ask("hi").await, Err(err));

        let relay = LlmRelay::new(scripted(Ok("unused".to_string()), false), "", 0.7, 800);
        assert!(matches!(relay.ask("hi").await, Err(LlmError::ProviderDisabled { .. })));
    }

    #[test]
    fn test_from_config_disabled_and_invalid() {
        let config = LlmConfig::default();
        assert!(LlmRelay::from_config(&config).unwrap().is_none());

        let config = LlmConfig {
            enabled: true,
            provider: "openai".to_string(),
            api_key: String::new(),
            ..LlmConfig::default()
        };
        assert!(LlmRelay::from_config(&config).is_err());

        let config = LlmConfig {
            enabled: true,
            provider: "ollama".to_string(),
            ..LlmConfig::default()
        };
        let relay = LlmRelay::from_config(&config).unwrap().unwrap();
        assert_eq!(relay.provider(), Provider::Ollama);
    }
}
