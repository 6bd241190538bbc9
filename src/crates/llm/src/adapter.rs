//! Provider adapter - builds a ready-to-invoke chat model from a [`ModelConfig`].
//!
//! Credentials come from the environment (`OPENAI_API_KEY`,
//! `ANTHROPIC_API_KEY`). A missing credential fails fast with
//! [`LlmError::ApiKeyNotFound`] and an unknown provider name with
//! [`LlmError::UnsupportedProvider`]; [`connect_or_unavailable`] turns either
//! into `None` so a caller holding two models can still use the other one.

use crate::chat::{ChatModel, ChatRequest, ChatResponse};
use crate::config::{ModelConfig, Provider, RemoteLlmConfig};
use crate::error::{LlmError, Result};
use crate::remote::{ClaudeClient, OpenAiClient};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// A concrete provider client selected from configuration.
#[derive(Clone)]
pub enum ProviderClient {
    OpenAi(OpenAiClient),
    Claude(ClaudeClient),
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi(client) => write!(f, "ProviderClient::OpenAi({})", client.model()),
            Self::Claude(client) => write!(f, "ProviderClient::Claude({})", client.model()),
        }
    }
}

impl ProviderClient {
    /// Build a client reading credentials from the process environment.
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Build a client reading credentials through `lookup`.
    ///
    /// Empty values count as missing.
    pub fn from_lookup<F>(config: &ModelConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = config.provider()?;
        let api_key = lookup(provider.api_key_env())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                LlmError::ApiKeyNotFound(format!(
                    "{} API key not found (set {})",
                    provider,
                    provider.api_key_env()
                ))
            })?;

        let base_url = lookup(provider.base_url_env())
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| provider.default_base_url().to_string());

        let remote_config = RemoteLlmConfig::new(api_key, base_url, config.model_name.clone())
            .with_temperature(config.temperature);

        debug!(
            provider = %provider,
            model = %config.model_name,
            base_url = %remote_config.base_url,
            "Creating provider client"
        );

        match provider {
            Provider::OpenAi => Ok(Self::OpenAi(OpenAiClient::new(remote_config)?)),
            Provider::Claude => Ok(Self::Claude(ClaudeClient::new(remote_config)?)),
        }
    }

    /// Model name the client sends requests to.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAi(client) => client.model(),
            Self::Claude(client) => client.model(),
        }
    }
}

#[async_trait]
impl ChatModel for ProviderClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        match self {
            Self::OpenAi(client) => client.chat(request).await,
            Self::Claude(client) => client.chat(request).await,
        }
    }
}

/// Build a shareable chat model for `config`.
pub fn connect(config: &ModelConfig) -> Result<Arc<dyn ChatModel>> {
    Ok(Arc::new(ProviderClient::from_config(config)?))
}

/// Build a chat model for `config`, or `None` when it cannot be configured.
///
/// The failure is logged and swallowed; this is the "unavailable" state.
pub fn connect_or_unavailable(config: &ModelConfig) -> Option<Arc<dyn ChatModel>> {
    connect_or_unavailable_with(config, |name| std::env::var(name).ok())
}

/// [`connect_or_unavailable`] reading credentials through `lookup`.
pub fn connect_or_unavailable_with<F>(config: &ModelConfig, lookup: F) -> Option<Arc<dyn ChatModel>>
where
    F: Fn(&str) -> Option<String>,
{
    match ProviderClient::from_lookup(config, lookup) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) if e.is_config_error() => {
            warn!(
                provider = %config.provider,
                model = %config.model_name,
                error = %e,
                "Model unavailable"
            );
            None
        }
        Err(e) => {
            error!(
                provider = %config.provider,
                model = %config.model_name,
                error = %e,
                "Failed to build model client"
            );
            None
        }
    }
}

/// Whether the credential for `provider` is present in the environment.
pub fn has_credentials(provider: Provider) -> bool {
    std::env::var(provider.api_key_env())
        .map(|key| !key.trim().is_empty())
        .unwrap_or(false)
}
