//! # Gateway - dual-model text generation
//!
//! Fills a prompt template, asks a primary chat model for a response and falls
//! back to a secondary model when the primary fails or takes too long. Every
//! call reports the dollar cost of the response that was returned.
//!
//! ## Features
//!
//! - **Bounded calls** - each model call runs on its own task under a deadline
//!   (40s primary, 15s secondary by default)
//! - **Single fallback** - the secondary is tried once, only when the primary
//!   did not succeed
//! - **Cost accounting** - token usage priced from a per-model table
//! - **Layered settings** - user and project TOML files with `${VAR}` expansion
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gateway::{FallbackOrchestrator, PromptTemplate, SettingsLoader, Variables};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = SettingsLoader::new().load(None).await?;
//! let orchestrator = FallbackOrchestrator::from_settings(&settings);
//!
//! let template = PromptTemplate::new("Write three quiz questions about {topic}.");
//! let mut variables = Variables::new();
//! variables.insert("topic".to_string(), "photosynthesis".to_string());
//!
//! let (text, cost) = orchestrator.generate(&template, &variables).await;
//! println!("{}\n(cost: ${:.6})", text, cost);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod invoker;
pub mod orchestrator;
pub mod pricing;
pub mod prompt;
pub mod settings;

// Re-export commonly used types
pub use error::{GatewayError, Result};
pub use invoker::{invoke_with_timeout, InvocationOutcome, Slot};
pub use orchestrator::{
    FallbackOrchestrator, FallbackOrchestratorBuilder, Generation, ModelSlot, ALL_MODELS_FAILED,
};
pub use pricing::{default_price_table, CostRecord, ModelPrice, PriceTable};
pub use prompt::{InvocationRequest, PromptTemplate, Variables};
pub use settings::{GatewaySettings, PriceEntry, SettingsLoader, TimeoutSettings};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
