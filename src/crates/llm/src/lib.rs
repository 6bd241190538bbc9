//! Chat model clients for the generation gateway.
//!
//! This crate provides the [`ChatModel`] trait, the provider-agnostic request
//! and response types, concrete clients for the remote providers the gateway
//! supports, and the provider adapter that builds a client from a
//! [`ModelConfig`].
//!
//! # Remote Providers
//!
//! - **OpenAI** - Chat Completions API (`OPENAI_API_KEY`)
//! - **Claude** - Anthropic Messages API (`ANTHROPIC_API_KEY`)
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use llm::{adapter, ChatRequest, Message, ModelConfig, Provider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ModelConfig::new(Provider::OpenAi, "gpt-4o-mini", 0.0);
//!     let model = adapter::connect(&config)?;
//!
//!     let request = ChatRequest::new(vec![Message::human("What is Rust?")]);
//!     let response = model.chat(request).await?;
//!
//!     println!("Response: {}", response.text());
//!     println!("Tokens: {:?}", response.token_counts());
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod chat;
pub mod config;
pub mod error;
pub mod remote;

// Re-export commonly used types
pub use adapter::ProviderClient;
pub use chat::{ChatModel, ChatRequest, ChatResponse, Message, MessageRole, UsageMetadata};
pub use config::{ModelConfig, Provider, RemoteLlmConfig};
pub use error::{LlmError, Result};
