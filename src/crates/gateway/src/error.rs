//! Error types for the generation gateway.
//!
//! None of these escape [`FallbackOrchestrator::generate`]; they describe why a
//! slot failed or why a cost could not be computed, and are logged.
//!
//! [`FallbackOrchestrator::generate`]: crate::FallbackOrchestrator::generate

use std::time::Duration;
use thiserror::Error;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Unreadable or malformed settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The upstream provider call failed.
    #[error("Provider error: {0}")]
    Provider(#[from] llm::LlmError),

    /// A worker did not finish within its bound.
    #[error("Timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// Pricing lookup miss.
    #[error("Unknown model for pricing: {0}")]
    UnknownModel(String),

    /// Prompt template could not be rendered.
    #[error("Template error: {0}")]
    Template(String),
}

impl From<toml::de::Error> for GatewayError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration(format!("Failed to parse settings: {}", err))
    }
}
