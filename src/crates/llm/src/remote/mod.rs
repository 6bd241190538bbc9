//! Remote LLM provider implementations.
//!
//! These providers require API keys read from the environment.
//!
//! # Providers
//!
//! - **OpenAI** - OpenAI models (GPT-4o, GPT-4o mini)
//! - **Claude** - Anthropic's Claude models (Claude 3 Haiku, Claude 3.5 Sonnet)

pub mod claude;
pub mod openai;

pub use claude::ClaudeClient;
pub use openai::OpenAiClient;
