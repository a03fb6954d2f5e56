//! Mock Portfolio Engine
//!
//! For testing and demos. Issues sequential `portfolio_<n>.PF` ids the way
//! the real engine names its portfolio objects.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use super::{ConstructedPortfolio, PortfolioEngine};
use crate::error::{AdvisorError, Result};

/// Mock engine with a sequential id counter
pub struct MockPortfolioEngine {
    counter: AtomicU32,
    fail: bool,
    with_ids: bool,
}

impl Default for MockPortfolioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPortfolioEngine {
    pub fn new() -> Self {
        Self {
            counter: AtomicU32::new(0),
            fail: false,
            with_ids: true,
        }
    }

    /// Engine that rejects every construction, for error-path tests
    pub fn failing() -> Self {
        Self {
            counter: AtomicU32::new(0),
            fail: true,
            with_ids: true,
        }
    }

    /// Engine that never assigns canonical ids, forcing synthesized keys
    pub fn without_ids() -> Self {
        Self {
            counter: AtomicU32::new(0),
            fail: false,
            with_ids: false,
        }
    }
}

#[async_trait]
impl PortfolioEngine for MockPortfolioEngine {
    async fn construct_portfolio(
        &self,
        symbols: &[String],
        weights: &[f64],
        currency: &str,
    ) -> Result<ConstructedPortfolio> {
        if self.fail {
            return Err(AdvisorError::Engine("mock engine configured to fail".into()));
        }
        if symbols.is_empty() || symbols.len() != weights.len() {
            return Err(AdvisorError::Engine(format!(
                "{} symbols with {} weights",
                symbols.len(),
                weights.len()
            )));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let canonical_id = self.with_ids.then(|| format!("portfolio_{n}.PF"));

        Ok(ConstructedPortfolio {
            canonical_id,
            description: format!("{} ({currency})", symbols.join(", ")),
        })
    }

    fn name(&self) -> &str {
        "MockEngine"
    }
}
