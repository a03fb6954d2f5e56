//! Financial Engine Integration
//!
//! Abstraction over the external financial-analytics engine. The core only
//! cares whether construction succeeded and what canonical id, if any, the
//! engine assigned.

mod mock;

pub use mock::MockPortfolioEngine;

use async_trait::async_trait;

use crate::error::Result;

/// Result of asking the engine to build a portfolio
#[derive(Clone, Debug)]
pub struct ConstructedPortfolio {
    /// Engine-assigned canonical id, if the engine provides one
    pub canonical_id: Option<String>,

    /// Short description suitable for display
    pub description: String,
}

/// Portfolio engine trait (Strategy pattern)
///
/// Implement this for the real analytics backend; the core ships a mock.
#[async_trait]
pub trait PortfolioEngine: Send + Sync {
    /// Construct a portfolio from aligned symbols and weights
    async fn construct_portfolio(
        &self,
        symbols: &[String],
        weights: &[f64],
        currency: &str,
    ) -> Result<ConstructedPortfolio>;

    /// Engine name
    fn name(&self) -> &str;
}
