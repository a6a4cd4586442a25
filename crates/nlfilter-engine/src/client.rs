//! Model client boundary
//!
//! The only component that crosses the network. [`ModelClient`] is the
//! narrow seam tests mock; [`OpenAiClient`] is the production adapter over
//! the OpenAI chat-completion API.

use crate::config::ModelConfig;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use thiserror::Error;

/// Generation parameters forwarded on every completion request.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl From<&ModelConfig> for GenerationParams {
    fn from(config: &ModelConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Failure modes the adapter must keep distinct.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model backend is not configured: {0}")]
    NotConfigured(String),

    #[error("model request failed: {0}")]
    Request(#[from] async_openai::error::OpenAIError),

    #[error("model returned an empty response")]
    EmptyResponse,
}

/// Whether a backend can take requests, and if not, why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable { reason: String },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Availability::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Chat-style completion boundary over the remote model service.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Cheap, side-effect-free readiness check.
    fn availability(&self) -> Availability;

    /// Send (system instruction, user instruction) and return the raw text
    /// completion.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        params: &GenerationParams,
    ) -> Result<String, ModelError>;
}

/// Production adapter over the OpenAI API.
///
/// Built without a credential it stays constructible but reports itself
/// unavailable, so a translator wired against it degrades instead of
/// failing at startup.
pub struct OpenAiClient {
    client: Option<Client<OpenAIConfig>>,
}

impl OpenAiClient {
    /// Build from `OPENAI_API_KEY` / `OPENAI_ORGANIZATION` environment
    /// variables (load a `.env` file first via `dotenvy` if desired).
    pub fn from_env() -> Self {
        let client = match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => {
                let mut config = OpenAIConfig::new().with_api_key(key);
                if let Ok(org) = std::env::var("OPENAI_ORGANIZATION") {
                    if !org.trim().is_empty() {
                        config = config.with_org_id(org);
                    }
                }
                Some(Client::with_config(config))
            }
            _ => None,
        };
        Self { client }
    }

    /// Build from an explicit credential.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.into());
        Self {
            client: Some(Client::with_config(config)),
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    fn availability(&self) -> Availability {
        match &self.client {
            Some(_) => Availability::Available,
            None => Availability::unavailable("OPENAI_API_KEY is not set"),
        }
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        params: &GenerationParams,
    ) -> Result<String, ModelError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ModelError::NotConfigured("OPENAI_API_KEY is not set".to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&params.model)
            .messages(vec![
                ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(system)
                        .build()?,
                ),
                ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(user)
                        .build()?,
                ),
            ])
            .temperature(params.temperature)
            .max_tokens(params.max_tokens)
            .build()?;

        let response = client.chat().create(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }

        tracing::debug!(model = %params.model, chars = content.len(), "model completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;

    #[test]
    fn test_generation_params_from_config() {
        let params = GenerationParams::from(&ModelConfig::default());
        assert_eq!(params.model, "gpt-3.5-turbo");
        assert_eq!(params.temperature, 0.1);
        assert_eq!(params.max_tokens, 500);
    }

    #[test]
    fn test_unconfigured_client_reports_reason() {
        let client = OpenAiClient { client: None };
        match client.availability() {
            Availability::Unavailable { reason } => assert!(reason.contains("OPENAI_API_KEY")),
            Availability::Available => panic!("client without credential must be unavailable"),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_client_refuses_requests() {
        let client = OpenAiClient { client: None };
        let params = GenerationParams::from(&ModelConfig::default());
        let err = client.complete("system", "user", &params).await.unwrap_err();
        assert!(matches!(err, ModelError::NotConfigured(_)));
    }

    #[test]
    fn test_configured_client_is_available() {
        let client = OpenAiClient::with_api_key("sk-test");
        assert!(client.availability().is_available());
    }
}
