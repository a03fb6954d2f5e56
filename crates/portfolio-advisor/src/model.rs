//! Domain Models
//!
//! Configuration and the ephemeral comparison-request shape built per
//! invocation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use bot_core::PortfolioSpec;

use crate::parse::NORMALIZE_TOLERANCE;

/// Advisor configuration, supplied by the surrounding bot
#[derive(Clone, Debug)]
pub struct AdvisorConfig {
    /// Currency codes recognized as trailing arguments
    pub known_currencies: HashSet<String>,

    /// Currency used when the user supplies none
    pub default_currency: String,

    /// Normalization tolerance passed to the weight parser
    pub normalize_tolerance: f64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        let known_currencies = ["USD", "RUB", "EUR", "GBP", "CNY", "HKD", "JPY", "ILS", "CHF"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        Self {
            known_currencies,
            default_currency: "USD".into(),
            normalize_tolerance: NORMALIZE_TOLERANCE,
        }
    }
}

/// An entry in a comparison: a plain ticker or a resolved saved portfolio
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpandedSymbol {
    /// A plain asset ticker
    Asset(String),

    /// A saved portfolio, carried by key and composition. The engine's own
    /// handle stays with the engine; the core only needs identity, weights,
    /// and currency.
    Portfolio { key: String, spec: PortfolioSpec },
}

/// Per-entry context used to render commentary about a comparison member
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PortfolioContext {
    /// The symbol as it appears in `clean_symbols`
    pub symbol: String,

    /// Constituent tickers (the symbol itself for plain assets)
    pub portfolio_symbols: Vec<String>,

    /// Weights aligned with `portfolio_symbols`
    pub portfolio_weights: Vec<f64>,

    /// Display currency
    pub portfolio_currency: String,
}

impl PortfolioContext {
    /// Context for a plain asset: the symbol alone at weight 1.0
    pub fn asset(symbol: impl Into<String>, currency: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            portfolio_symbols: vec![symbol.clone()],
            portfolio_weights: vec![1.0],
            portfolio_currency: currency.into(),
            symbol,
        }
    }

    /// Context for a resolved saved portfolio
    pub fn portfolio(key: impl Into<String>, spec: &PortfolioSpec) -> Self {
        Self {
            symbol: key.into(),
            portfolio_symbols: spec.symbols.clone(),
            portfolio_weights: spec.weights.clone(),
            portfolio_currency: spec.currency.clone(),
        }
    }
}

/// A fully resolved comparison request, built per invocation and never
/// persisted. The four lists are index-aligned and equal length.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComparisonRequest {
    /// Tokens exactly as the user typed them
    pub raw_tokens: Vec<String>,

    /// Uppercased symbols or portfolio keys, deduplicated
    pub clean_symbols: Vec<String>,

    /// Human-readable labels, e.g. `PF_1 (SPY.US, AGG.US)`
    pub display_symbols: Vec<String>,

    /// Resolved entries
    pub expanded: Vec<ExpandedSymbol>,

    /// Per-entry commentary context
    pub contexts: Vec<PortfolioContext>,

    /// Non-fatal notices accumulated during resolution
    pub notices: Vec<String>,

    /// Requested display currency, if any
    pub currency: Option<String>,

    /// Requested period, if any
    pub period: Option<String>,
}

impl ComparisonRequest {
    /// Number of entries after deduplication
    pub fn len(&self) -> usize {
        self.clean_symbols.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.clean_symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_currencies() {
        let config = AdvisorConfig::default();
        assert!(config.known_currencies.contains("USD"));
        assert!(config.known_currencies.contains("RUB"));
        assert!(!config.known_currencies.contains("SPY.US"));
    }

    #[test]
    fn test_asset_context() {
        let ctx = PortfolioContext::asset("SPY.US", "USD");
        assert_eq!(ctx.portfolio_symbols, vec!["SPY.US"]);
        assert_eq!(ctx.portfolio_weights, vec![1.0]);
    }
}
