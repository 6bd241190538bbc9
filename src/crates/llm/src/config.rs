//! Configuration structures for chat model providers.

use crate::error::{LlmError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Supported chat model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// OpenAI Chat Completions API.
    OpenAi,
    /// Anthropic Messages API.
    Claude,
}

impl Provider {
    /// Environment variable holding the API key for this provider.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Claude => "ANTHROPIC_API_KEY",
        }
    }

    /// Environment variable that may override the API base URL.
    pub fn base_url_env(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_BASE_URL",
            Provider::Claude => "ANTHROPIC_BASE_URL",
        }
    }

    /// Public API base URL.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Claude => "https://api.anthropic.com",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Claude => "Claude",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "claude" | "anthropic" => Ok(Provider::Claude),
            other => Err(LlmError::UnsupportedProvider(format!(
                "{}. Available: OpenAI, Claude",
                other
            ))),
        }
    }
}

impl From<Provider> for String {
    fn from(provider: Provider) -> Self {
        provider.as_str().to_string()
    }
}

/// Which provider and model a gateway slot uses.
///
/// The provider is kept as written. An unknown spelling only fails when a
/// client is built from this config, see [`ModelConfig::provider`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider name as configured, e.g. `"OpenAI"` or `"Claude"`.
    pub provider: String,

    /// Model name, also the key into the price table.
    pub model_name: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl ModelConfig {
    pub fn new(
        provider: impl Into<String>,
        model_name: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            provider: provider.into(),
            model_name: model_name.into(),
            temperature,
        }
    }

    /// Parse the configured provider name.
    pub fn provider(&self) -> Result<Provider> {
        self.provider.parse()
    }
}

/// Configuration for remote LLM providers (OpenAI, Anthropic).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    /// API key for authentication.
    pub api_key: String,

    /// Base URL for the API.
    ///
    /// Examples:
    /// - OpenAI: "https://api.openai.com/v1"
    /// - Anthropic: "https://api.anthropic.com"
    pub base_url: String,

    /// Model name/identifier.
    pub model: String,

    /// Default sampling temperature when the request does not set one.
    pub temperature: Option<f32>,

    /// HTTP request timeout duration.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl RemoteLlmConfig {
    /// Create a new remote LLM configuration.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            temperature: None,
            timeout: default_timeout(),
        }
    }

    /// Set the default temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_temperature() -> f32 {
    0.7
}
