//! Per-model token pricing and cost calculation.

use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Price of one model, in dollars per token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPrice {
    pub input_per_token: f64,
    pub output_per_token: f64,
}

impl ModelPrice {
    pub fn new(input_per_token: f64, output_per_token: f64) -> Self {
        Self {
            input_per_token,
            output_per_token,
        }
    }

    /// Build from dollars per million tokens, the unit providers publish.
    pub fn per_million(input: f64, output: f64) -> Self {
        Self::new(input / 1_000_000.0, output / 1_000_000.0)
    }

    /// Calculate cost for a request
    pub fn calculate_cost(&self, input_tokens: usize, output_tokens: usize) -> f64 {
        let input_cost = input_tokens as f64 * self.input_per_token;
        let output_cost = output_tokens as f64 * self.output_per_token;
        input_cost + output_cost
    }
}

/// Dollar cost of one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub dollars: f64,
}

impl CostRecord {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Prices keyed by exact model name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable {
    prices: BTreeMap<String, ModelPrice>,
}

impl PriceTable {
    /// An empty table; every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the price for `model`.
    pub fn with_price(mut self, model: impl Into<String>, price: ModelPrice) -> Self {
        self.insert(model, price);
        self
    }

    pub fn insert(&mut self, model: impl Into<String>, price: ModelPrice) {
        self.prices.insert(model.into(), price);
    }

    pub fn get(&self, model: &str) -> Option<&ModelPrice> {
        self.prices.get(model)
    }

    /// Overlay `other` on this table; entries in `other` win.
    pub fn merge(&mut self, other: PriceTable) {
        self.prices.extend(other.prices);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelPrice)> {
        self.prices.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// `input_tokens * input price + output_tokens * output price` for `model`.
    pub fn cost(&self, model: &str, input_tokens: usize, output_tokens: usize) -> Result<f64> {
        self.get(model)
            .map(|price| price.calculate_cost(input_tokens, output_tokens))
            .ok_or_else(|| GatewayError::UnknownModel(model.to_string()))
    }
}

/// Reference prices (as of late 2024).
///
/// `claude-3-5-sonnet-20241022` output is listed at $1.25/M here, which
/// differs from Anthropic's published rate; override it through settings
/// where that matters.
pub fn default_price_table() -> PriceTable {
    PriceTable::new()
        .with_price("gpt-4o-mini", ModelPrice::per_million(0.150, 0.600))
        .with_price(
            "claude-3-haiku-20240307",
            ModelPrice::per_million(0.25, 1.25),
        )
        .with_price(
            "claude-3-5-sonnet-20241022",
            ModelPrice::per_million(3.0, 1.25),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_cost_formula() {
        let table = PriceTable::new().with_price("A", ModelPrice::new(0.0000001, 0.0000002));

        let cost = table.cost("A", 100, 20).unwrap();
        assert!(approx_eq(cost, 0.000014), "cost was {}", cost);
    }

    #[test]
    fn test_cost_is_pure() {
        let table = default_price_table();

        let first = table.cost("gpt-4o-mini", 1234, 567).unwrap();
        let second = table.cost("gpt-4o-mini", 1234, 567).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(table, default_price_table());
    }

    #[test]
    fn test_unknown_model() {
        let table = default_price_table();
        let err = table.cost("gpt-5-ultra", 10, 10).unwrap_err();
        assert!(matches!(err, GatewayError::UnknownModel(ref m) if m == "gpt-5-ultra"));
    }

    #[test]
    fn test_lookup_is_exact() {
        let table = default_price_table();
        assert!(table.get("claude-3-haiku").is_none());
        assert!(table.get("claude-3-haiku-20240307").is_some());
    }

    #[test]
    fn test_zero_priced_model() {
        let table = PriceTable::new().with_price("B", ModelPrice::new(0.0, 0.0));
        assert_eq!(table.cost("B", 0, 0).unwrap(), 0.0);
        assert_eq!(table.cost("B", 500, 500).unwrap(), 0.0);
    }

    #[test]
    fn test_per_million() {
        let price = ModelPrice::per_million(0.150, 0.600);
        assert!(approx_eq(price.calculate_cost(1_000_000, 0), 0.15));
        assert!(approx_eq(price.calculate_cost(0, 1_000_000), 0.6));
    }

    #[test]
    fn test_merge_overrides() {
        let mut table = default_price_table();
        let overrides =
            PriceTable::new().with_price("claude-3-5-sonnet-20241022", ModelPrice::per_million(3.0, 15.0));

        table.merge(overrides);

        assert_eq!(table.len(), 3);
        let price = table.get("claude-3-5-sonnet-20241022").unwrap();
        assert!(approx_eq(price.output_per_token, 15.0 / 1_000_000.0));
    }
}
