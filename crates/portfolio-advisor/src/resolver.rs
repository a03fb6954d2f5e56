//! Comparison Resolver
//!
//! Expands a list of user-typed references (mixed assets and portfolio
//! references) into the index-aligned lists of a `ComparisonRequest`, and
//! applies the duplicate policy.

use std::collections::HashSet;

use bot_core::UserSession;

use crate::error::{AdvisorError, Result};
use crate::model::{AdvisorConfig, ComparisonRequest, ExpandedSymbol, PortfolioContext};
use crate::parse::upper_symbol;
use crate::registry;

/// Resolve raw references against a user's saved portfolios.
///
/// Exactly two identical entries fail the whole request; three or more
/// entries with duplicates are silently deduplicated with a notice.
pub fn resolve(
    session: &UserSession,
    raw_symbols: &[String],
    config: &AdvisorConfig,
) -> Result<ComparisonRequest> {
    let mut clean_symbols = Vec::with_capacity(raw_symbols.len());
    let mut display_symbols = Vec::with_capacity(raw_symbols.len());
    let mut expanded = Vec::with_capacity(raw_symbols.len());
    let mut contexts = Vec::with_capacity(raw_symbols.len());
    let mut notices = Vec::new();

    for raw in raw_symbols {
        let symbol = upper_symbol(raw);

        if let Some((key, spec)) = registry::lookup_entry(session, raw) {
            let key = key.to_string();
            clean_symbols.push(key.clone());
            display_symbols.push(format!("{key} ({})", spec.symbols.join(", ")));
            contexts.push(PortfolioContext::portfolio(key.clone(), spec));
            expanded.push(ExpandedSymbol::Portfolio {
                key,
                spec: spec.clone(),
            });
        } else {
            clean_symbols.push(symbol.clone());
            display_symbols.push(symbol.clone());
            contexts.push(PortfolioContext::asset(&symbol, &config.default_currency));
            expanded.push(ExpandedSymbol::Asset(symbol));
        }
    }

    // Duplicate policy operates on the resolved symbols
    let duplicates = duplicate_indices(&clean_symbols);
    if !duplicates.is_empty() {
        if clean_symbols.len() == 2 {
            return Err(AdvisorError::DuplicateAssets(clean_symbols[0].clone()));
        }

        let dropped: Vec<String> = duplicates.iter().map(|&i| clean_symbols[i].clone()).collect();
        tracing::warn!(dropped = ?dropped, "removing duplicate comparison entries");
        notices.push(format!("Removed duplicate entries: {}", dropped.join(", ")));

        // Index-aligned removal, back to front
        for &i in duplicates.iter().rev() {
            clean_symbols.remove(i);
            display_symbols.remove(i);
            expanded.remove(i);
            contexts.remove(i);
        }
    }

    Ok(ComparisonRequest {
        raw_tokens: raw_symbols.to_vec(),
        clean_symbols,
        display_symbols,
        expanded,
        contexts,
        notices,
        currency: None,
        period: None,
    })
}

/// Indices of later duplicates, case-insensitive, first occurrence kept
fn duplicate_indices(symbols: &[String]) -> Vec<usize> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for (i, symbol) in symbols.iter().enumerate() {
        if !seen.insert(symbol.to_uppercase()) {
            duplicates.push(i);
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use bot_core::{PortfolioSpec, UserId};

    fn strs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn session_with_portfolio(key: &str, symbols: &[&str]) -> UserSession {
        let mut session = UserSession::new(UserId(1));
        let n = symbols.len();
        let spec = PortfolioSpec::new(strs(symbols), vec![1.0 / n as f64; n], "USD", key);
        registry::register(&mut session, spec);
        session
    }

    #[test]
    fn test_plain_assets_pass_through() {
        let session = UserSession::new(UserId(1));
        let request = resolve(&session, &strs(&["spy.us", "QQQ.US"]), &AdvisorConfig::default())
            .unwrap();

        assert_eq!(request.clean_symbols, vec!["SPY.US", "QQQ.US"]);
        assert_eq!(request.display_symbols, request.clean_symbols);
        assert_eq!(request.contexts[0].portfolio_weights, vec![1.0]);
        assert!(matches!(request.expanded[0], ExpandedSymbol::Asset(_)));
        assert!(request.notices.is_empty());
    }

    #[test]
    fn test_portfolio_reference_expanded() {
        let session = session_with_portfolio("PF_GROWTH", &["SPY.US", "QQQ.US"]);
        let request = resolve(
            &session,
            &strs(&["pf_growth", "AGG.US"]),
            &AdvisorConfig::default(),
        )
        .unwrap();

        assert_eq!(request.clean_symbols, vec!["PF_GROWTH", "AGG.US"]);
        assert_eq!(request.display_symbols[0], "PF_GROWTH (SPY.US, QQQ.US)");
        assert_eq!(request.contexts[0].portfolio_symbols, vec!["SPY.US", "QQQ.US"]);
        assert!(matches!(
            &request.expanded[0],
            ExpandedSymbol::Portfolio { key, .. } if key == "PF_GROWTH"
        ));
    }

    #[test]
    fn test_two_identical_assets_fail() {
        // P7, fatal half
        let session = UserSession::new(UserId(1));
        let result = resolve(
            &session,
            &strs(&["SPY.US", "spy.us"]),
            &AdvisorConfig::default(),
        );
        assert!(matches!(result, Err(AdvisorError::DuplicateAssets(_))));
    }

    #[test]
    fn test_three_with_duplicate_dedups_and_warns() {
        // P7, warning half
        let session = UserSession::new(UserId(1));
        let request = resolve(
            &session,
            &strs(&["SPY.US", "QQQ.US", "SPY.US"]),
            &AdvisorConfig::default(),
        )
        .unwrap();

        assert_eq!(request.clean_symbols, vec!["SPY.US", "QQQ.US"]);
        assert_eq!(request.display_symbols.len(), 2);
        assert_eq!(request.expanded.len(), 2);
        assert_eq!(request.contexts.len(), 2);
        assert_eq!(request.notices.len(), 1);
    }

    #[test]
    fn test_moex_scenario() {
        // Duplicate GAZP.MOEX removed, first-seen order kept
        let session = UserSession::new(UserId(1));
        let request = resolve(
            &session,
            &strs(&[
                "SBER.MOEX",
                "GAZP.MOEX",
                "LKOH.MOEX",
                "OBLG.MOEX",
                "GOLD.MOEX",
                "GAZP.MOEX",
            ]),
            &AdvisorConfig::default(),
        )
        .unwrap();

        assert_eq!(
            request.clean_symbols,
            vec![
                "SBER.MOEX",
                "GAZP.MOEX",
                "LKOH.MOEX",
                "OBLG.MOEX",
                "GOLD.MOEX"
            ]
        );
        assert!(!request.notices.is_empty());
    }

    #[test]
    fn test_no_duplicates_unchanged() {
        let session = UserSession::new(UserId(1));
        let request = resolve(
            &session,
            &strs(&["A", "B", "C"]),
            &AdvisorConfig::default(),
        )
        .unwrap();
        assert_eq!(request.len(), 3);
        assert!(request.notices.is_empty());
    }
}
