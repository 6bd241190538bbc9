//! Gateway settings
//!
//! Settings are layered, later layers overriding earlier ones:
//! 1. Built-in defaults (OpenAI `gpt-4o-mini` primary, Claude 3 Haiku
//!    secondary, 40s/15s timeouts, reference prices)
//! 2. User-level file: `<config dir>/gateway/gateway.toml`
//! 3. Project-level file: `./gateway.toml`
//! 4. A file named on the command line
//!
//! ```toml
//! [primary]
//! provider = "OpenAI"
//! model_name = "gpt-4o-mini"
//! temperature = 0.0
//!
//! [secondary]
//! provider = "Claude"
//! model_name = "${SECONDARY_MODEL:claude-3-haiku-20240307}"
//! temperature = 0.0
//!
//! [timeouts]
//! primary_secs = 40
//! secondary_secs = 15
//!
//! [pricing."claude-3-5-sonnet-20241022"]
//! input_per_million = 3.0
//! output_per_million = 15.0
//! ```

mod loader;

pub use loader::SettingsLoader;

use crate::pricing::{default_price_table, ModelPrice, PriceTable};
use llm::{ModelConfig, Provider};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Effective gateway settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Model tried first.
    pub primary: ModelConfig,

    /// Model tried when the primary does not succeed.
    pub secondary: ModelConfig,

    /// Per-slot wait bounds.
    pub timeouts: TimeoutSettings,

    /// Price overrides layered on the reference table.
    pub pricing: BTreeMap<String, PriceEntry>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            primary: ModelConfig::new(Provider::OpenAi, "gpt-4o-mini", 0.0),
            secondary: ModelConfig::new(Provider::Claude, "claude-3-haiku-20240307", 0.0),
            timeouts: TimeoutSettings::default(),
            pricing: BTreeMap::new(),
        }
    }
}

impl GatewaySettings {
    /// Apply one settings file on top of these settings.
    ///
    /// Sections absent from the file keep their current values; pricing
    /// entries are merged per model.
    pub fn apply(&mut self, file: SettingsFile) {
        if let Some(primary) = file.primary {
            self.primary = primary;
        }
        if let Some(secondary) = file.secondary {
            self.secondary = secondary;
        }
        if let Some(secs) = file.timeouts.primary_secs {
            self.timeouts.primary_secs = secs;
        }
        if let Some(secs) = file.timeouts.secondary_secs {
            self.timeouts.secondary_secs = secs;
        }
        self.pricing.extend(file.pricing);
    }

    /// Reference prices with the configured overrides applied.
    pub fn price_table(&self) -> PriceTable {
        let mut table = default_price_table();
        for (model, entry) in &self.pricing {
            table.insert(model.clone(), entry.to_price());
        }
        table
    }
}

/// How long each slot may take before it is abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutSettings {
    pub primary_secs: u64,
    pub secondary_secs: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            primary_secs: 40,
            secondary_secs: 15,
        }
    }
}

impl TimeoutSettings {
    pub fn primary(&self) -> Duration {
        Duration::from_secs(self.primary_secs)
    }

    pub fn secondary(&self) -> Duration {
        Duration::from_secs(self.secondary_secs)
    }
}

/// Price of one model in dollars per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl PriceEntry {
    pub fn to_price(&self) -> ModelPrice {
        ModelPrice::per_million(self.input_per_million, self.output_per_million)
    }
}

/// The contents of a single settings file; every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub primary: Option<ModelConfig>,
    pub secondary: Option<ModelConfig>,
    #[serde(default)]
    pub timeouts: PartialTimeouts,
    #[serde(default)]
    pub pricing: BTreeMap<String, PriceEntry>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialTimeouts {
    pub primary_secs: Option<u64>,
    pub secondary_secs: Option<u64>,
}
