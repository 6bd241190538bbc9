//! Primary/secondary fallback over two chat models.
//!
//! Each call tries the primary model under its timeout. If that attempt does
//! not succeed the secondary is tried once under its own, shorter timeout.
//! When neither succeeds the caller gets [`ALL_MODELS_FAILED`] with a cost of
//! zero. No error ever reaches the caller.

use crate::invoker::{invoke_with_timeout, InvocationOutcome, Slot};
use crate::pricing::{default_price_table, CostRecord, PriceTable};
use crate::prompt::{InvocationRequest, PromptTemplate, Variables};
use crate::settings::{GatewaySettings, TimeoutSettings};
use llm::{adapter, ChatModel, ModelConfig};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Text returned when neither model produced a response.
pub const ALL_MODELS_FAILED: &str = "Error: All models failed to generate a response.";

/// Detailed result of one generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generation {
    pub text: String,
    pub cost: CostRecord,
    /// `None` when both models failed.
    pub served_by: Option<Slot>,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl Generation {
    fn failed() -> Self {
        Self {
            text: ALL_MODELS_FAILED.to_string(),
            cost: CostRecord::zero(),
            served_by: None,
            input_tokens: 0,
            output_tokens: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.served_by.is_some()
    }
}

/// One configured model and its client, if one could be built.
#[derive(Clone)]
pub struct ModelSlot {
    pub config: ModelConfig,
    pub client: Option<Arc<dyn ChatModel>>,
}

impl ModelSlot {
    pub fn new(config: ModelConfig, client: Option<Arc<dyn ChatModel>>) -> Self {
        Self { config, client }
    }

    /// Build the client through the provider adapter; a configuration
    /// failure leaves the slot unavailable.
    pub fn connect(config: ModelConfig) -> Self {
        let client = adapter::connect_or_unavailable(&config);
        Self { config, client }
    }

    /// [`ModelSlot::connect`] reading credentials through `lookup`.
    pub fn connect_with<F>(config: ModelConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let client = adapter::connect_or_unavailable_with(&config, lookup);
        Self { config, client }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }
}

impl fmt::Debug for ModelSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSlot")
            .field("config", &self.config)
            .field("available", &self.is_available())
            .finish()
    }
}

/// Tries the primary model, then the secondary, and prices the result.
///
/// Immutable after construction; share it across tasks with `Arc`.
#[derive(Debug, Clone)]
pub struct FallbackOrchestrator {
    primary: ModelSlot,
    secondary: ModelSlot,
    prices: PriceTable,
    primary_timeout: Duration,
    secondary_timeout: Duration,
}

impl FallbackOrchestrator {
    pub fn builder() -> FallbackOrchestratorBuilder {
        FallbackOrchestratorBuilder::default()
    }

    /// Build both slots through the provider adapter.
    pub fn from_settings(settings: &GatewaySettings) -> Self {
        let orchestrator = Self::builder()
            .primary(ModelSlot::connect(settings.primary.clone()))
            .secondary(ModelSlot::connect(settings.secondary.clone()))
            .prices(settings.price_table())
            .timeouts(settings.timeouts)
            .build();

        info!(
            primary = %orchestrator.primary.config.model_name,
            primary_available = orchestrator.primary.is_available(),
            secondary = %orchestrator.secondary.config.model_name,
            secondary_available = orchestrator.secondary.is_available(),
            "Fallback orchestrator ready"
        );
        orchestrator
    }

    pub fn primary(&self) -> &ModelSlot {
        &self.primary
    }

    pub fn secondary(&self) -> &ModelSlot {
        &self.secondary
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Generate a response, returning `(text, cost_usd)`.
    pub async fn generate(&self, template: &PromptTemplate, variables: &Variables) -> (String, f64) {
        let generation = self.generate_detailed(template, variables).await;
        (generation.text, generation.cost.dollars)
    }

    /// Generate a response with token counts and the slot that served it.
    pub async fn generate_detailed(
        &self,
        template: &PromptTemplate,
        variables: &Variables,
    ) -> Generation {
        let request = InvocationRequest::new(template, variables);

        if let Some(generation) = self.attempt(Slot::Primary, &request).await {
            return generation;
        }
        info!("Primary model did not succeed, falling back to secondary");

        if let Some(generation) = self.attempt(Slot::Secondary, &request).await {
            return generation;
        }
        warn!("All models failed");

        Generation::failed()
    }

    async fn attempt(&self, slot: Slot, request: &InvocationRequest<'_>) -> Option<Generation> {
        let (model_slot, timeout) = match slot {
            Slot::Primary => (&self.primary, self.primary_timeout),
            Slot::Secondary => (&self.secondary, self.secondary_timeout),
        };
        let config = &model_slot.config;

        let Some(client) = &model_slot.client else {
            warn!(slot = %slot, model = %config.model_name, "Model unavailable, skipping");
            return None;
        };

        debug!(slot = %slot, model = %config.model_name, "Invoking model");
        match invoke_with_timeout(client, request, config.temperature, timeout, slot).await {
            InvocationOutcome::Success {
                text,
                input_tokens,
                output_tokens,
            } => {
                let cost = self.cost_of(&config.model_name, input_tokens, output_tokens);
                info!(
                    slot = %slot,
                    model = %config.model_name,
                    input_tokens = input_tokens,
                    output_tokens = output_tokens,
                    cost_usd = cost.dollars,
                    "Generation succeeded"
                );
                Some(Generation {
                    text,
                    cost,
                    served_by: Some(slot),
                    input_tokens,
                    output_tokens,
                })
            }
            InvocationOutcome::Error { message } => {
                warn!(slot = %slot, model = %config.model_name, error = %message, "Model failed");
                None
            }
            InvocationOutcome::Timeout => {
                warn!(
                    slot = %slot,
                    model = %config.model_name,
                    timeout_secs = timeout.as_secs_f64(),
                    "Model timed out"
                );
                None
            }
        }
    }

    fn cost_of(&self, model: &str, input_tokens: usize, output_tokens: usize) -> CostRecord {
        match self.prices.cost(model, input_tokens, output_tokens) {
            Ok(dollars) => CostRecord { dollars },
            Err(e) => {
                warn!(model = %model, error = %e, "No price for model, reporting zero cost");
                CostRecord::zero()
            }
        }
    }
}

/// Builder for [`FallbackOrchestrator`].
///
/// Defaults: the reference model configs with no clients (both unavailable),
/// the reference price table and 40s/15s timeouts.
#[derive(Debug, Clone)]
pub struct FallbackOrchestratorBuilder {
    primary: ModelSlot,
    secondary: ModelSlot,
    prices: PriceTable,
    timeouts: TimeoutSettings,
    primary_timeout: Option<Duration>,
    secondary_timeout: Option<Duration>,
}

impl Default for FallbackOrchestratorBuilder {
    fn default() -> Self {
        let defaults = GatewaySettings::default();
        Self {
            primary: ModelSlot::new(defaults.primary, None),
            secondary: ModelSlot::new(defaults.secondary, None),
            prices: default_price_table(),
            timeouts: defaults.timeouts,
            primary_timeout: None,
            secondary_timeout: None,
        }
    }
}

impl FallbackOrchestratorBuilder {
    pub fn primary(mut self, slot: ModelSlot) -> Self {
        self.primary = slot;
        self
    }

    pub fn secondary(mut self, slot: ModelSlot) -> Self {
        self.secondary = slot;
        self
    }

    /// Shorthand for a primary slot with an already-built client.
    pub fn primary_model(self, config: ModelConfig, client: Arc<dyn ChatModel>) -> Self {
        self.primary(ModelSlot::new(config, Some(client)))
    }

    /// Shorthand for a secondary slot with an already-built client.
    pub fn secondary_model(self, config: ModelConfig, client: Arc<dyn ChatModel>) -> Self {
        self.secondary(ModelSlot::new(config, Some(client)))
    }

    /// Replace the price table.
    pub fn prices(mut self, prices: PriceTable) -> Self {
        self.prices = prices;
        self
    }

    pub fn timeouts(mut self, timeouts: TimeoutSettings) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Sub-second primary timeout; takes precedence over [`Self::timeouts`].
    pub fn primary_timeout(mut self, timeout: Duration) -> Self {
        self.primary_timeout = Some(timeout);
        self
    }

    /// Sub-second secondary timeout; takes precedence over [`Self::timeouts`].
    pub fn secondary_timeout(mut self, timeout: Duration) -> Self {
        self.secondary_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> FallbackOrchestrator {
        FallbackOrchestrator {
            primary: self.primary,
            secondary: self.secondary,
            prices: self.prices,
            primary_timeout: self.primary_timeout.unwrap_or_else(|| self.timeouts.primary()),
            secondary_timeout: self
                .secondary_timeout
                .unwrap_or_else(|| self.timeouts.secondary()),
        }
    }
}
