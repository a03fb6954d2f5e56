//! Portfolio Spec Parser
//!
//! Turns loosely-formatted `SYMBOL(:WEIGHT)?` lists into validated
//! (symbol, weight) pairs with diagnostics.

use serde::{Deserialize, Serialize};

use super::tokenize::{normalize_weight_commas, split_tokens, upper_symbol};
use crate::error::{AdvisorError, Result};

/// Default tolerance for silently rescaling a near-1.0 weight total.
///
/// Wide enough that a total of 1.1 is normalized, narrow enough that a
/// total of 0.5 is left alone and flagged.
pub const NORMALIZE_TOLERANCE: f64 = 0.3;

/// Below this deviation a total counts as exactly 1.0 (float dust from
/// summing parsed weights)
const EXACT_SUM_EPS: f64 = 1e-9;

const USAGE_EXAMPLE: &str = "Example: SPY.US:0.6, AGG.US:0.4 (or just SPY.US, AGG.US for equal weights)";

/// Outcome of parsing a portfolio spec string
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParseResult {
    /// Whether the input was accepted
    pub ok: bool,

    /// (symbol, weight) pairs in first-seen order; empty when `ok` is false
    pub pairs: Vec<(String, f64)>,

    /// Human-readable notes: fatal reasons when `ok` is false, warnings
    /// otherwise
    pub diagnostics: Vec<String>,
}

impl ParseResult {
    fn failure(diagnostic: impl Into<String>) -> Self {
        Self {
            ok: false,
            pairs: Vec::new(),
            diagnostics: vec![diagnostic.into()],
        }
    }

    /// Symbols only, in order
    pub fn symbols(&self) -> Vec<String> {
        self.pairs.iter().map(|(s, _)| s.clone()).collect()
    }

    /// Weights only, aligned with `symbols()`
    pub fn weights(&self) -> Vec<f64> {
        self.pairs.iter().map(|(_, w)| *w).collect()
    }
}

/// Tolerant parser for `SYMBOL(:WEIGHT)?` token lists
#[derive(Clone, Debug)]
pub struct WeightParser {
    /// How far the weight total may sit from 1.0 and still be rescaled
    pub tolerance: f64,
}

impl Default for WeightParser {
    fn default() -> Self {
        Self {
            tolerance: NORMALIZE_TOLERANCE,
        }
    }
}

impl WeightParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a custom normalization tolerance
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Parse free text into validated (symbol, weight) pairs.
    ///
    /// Bare symbols share whatever probability mass the explicit weights
    /// leave unclaimed; a near-1.0 total is rescaled, a far-off total is
    /// flagged but accepted.
    pub fn parse(&self, text: &str) -> ParseResult {
        if text.trim().is_empty() {
            return ParseResult::failure(format!("Empty input. {USAGE_EXAMPLE}"));
        }

        let normalized = normalize_weight_commas(text);
        let tokens = split_tokens(&normalized);
        if tokens.is_empty() {
            return ParseResult::failure(format!("Empty input. {USAGE_EXAMPLE}"));
        }

        let mut diagnostics = Vec::new();

        // None = bare symbol, weight assigned below
        let mut pairs: Vec<(String, Option<f64>)> = Vec::with_capacity(tokens.len());
        for token in &tokens {
            match token.split_once(':') {
                Some((symbol, weight)) => {
                    let symbol = upper_symbol(symbol);
                    let Ok(weight) = weight.trim().parse::<f64>() else {
                        return ParseResult::failure(format!(
                            "Invalid weight for {symbol}: '{}' is not a number. {USAGE_EXAMPLE}",
                            weight.trim()
                        ));
                    };
                    pairs.push((symbol, Some(weight)));
                }
                None => pairs.push((upper_symbol(token), None)),
            }
        }

        // Bare symbols share the unclaimed remainder equally
        let explicit_sum: f64 = pairs.iter().filter_map(|(_, w)| *w).sum();
        let bare_count = pairs.iter().filter(|(_, w)| w.is_none()).count();
        if bare_count > 0 {
            let share = (1.0 - explicit_sum).max(0.0) / bare_count as f64;
            for (_, weight) in &mut pairs {
                if weight.is_none() {
                    *weight = Some(share);
                }
            }
        }

        let mut pairs: Vec<(String, f64)> = pairs
            .into_iter()
            .map(|(s, w)| (s, w.unwrap_or(0.0)))
            .collect();

        // Range check before any rescaling
        for (symbol, weight) in &pairs {
            if *weight <= 0.0 || *weight > 1.0 {
                return ParseResult::failure(format!(
                    "Invalid weight for {symbol}: {weight} is outside (0, 1]. {USAGE_EXAMPLE}"
                ));
            }
        }

        let total: f64 = pairs.iter().map(|(_, w)| w).sum();
        let deviation = (total - 1.0).abs();
        if deviation > EXACT_SUM_EPS {
            if deviation <= self.tolerance {
                for (_, weight) in &mut pairs {
                    *weight /= total;
                }
                tracing::debug!(total, "rescaled weights to sum 1.0");
                diagnostics.push(format!(
                    "Weights summed to {total:.3}; normalized to 1.0."
                ));
            } else {
                diagnostics.push(format!(
                    "Weights sum to {total:.3}, which should be close to 1.0."
                ));
            }
        }

        ParseResult {
            ok: true,
            pairs,
            diagnostics,
        }
    }

    /// Parse a bare list of `expected` weights for the two-step portfolio
    /// flow, applying the same range check and normalization policy.
    pub fn parse_weight_list(&self, text: &str, expected: usize) -> Result<Vec<f64>> {
        let normalized = normalize_weight_commas(text);
        let tokens = split_tokens(&normalized);

        if tokens.len() != expected {
            return Err(AdvisorError::InvalidInput(format!(
                "Expected {expected} weights, got {}",
                tokens.len()
            )));
        }

        let mut weights = Vec::with_capacity(expected);
        for token in &tokens {
            let weight = token.parse::<f64>().map_err(|_| AdvisorError::InvalidWeight {
                symbol: token.clone(),
                detail: "not a number".into(),
            })?;
            if weight <= 0.0 || weight > 1.0 {
                return Err(AdvisorError::InvalidWeight {
                    symbol: token.clone(),
                    detail: format!("{weight} is outside (0, 1]"),
                });
            }
            weights.push(weight);
        }

        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > EXACT_SUM_EPS && (total - 1.0).abs() <= self.tolerance {
            for weight in &mut weights {
                *weight /= total;
            }
        }

        Ok(weights)
    }
}
