//! Portfolio Registry
//!
//! Canonical key generation and the fuzzy lookup that resolves a
//! user-typed reference to a saved portfolio by key, casing, or
//! constituent-asset set.

use std::collections::HashSet;

use bot_core::{PortfolioSpec, UserSession};

use crate::parse::{split_tokens, upper_symbol};

/// Substrings that mark a reference as a portfolio name rather than an
/// asset ticker.
const PORTFOLIO_INDICATORS: [&str; 4] = ["PORTFOLIO_", "PF_", ".PF", ".pf"];

/// Register a spec under a canonical key and return the key.
///
/// The engine-assigned id is preferred; otherwise a `PF_<n>` key is
/// synthesized from the monotonic per-session counter.
pub fn register(session: &mut UserSession, spec: PortfolioSpec) -> String {
    let key = if spec.canonical_id.is_empty() {
        format!("PF_{}", session.portfolio_count + 1)
    } else {
        spec.canonical_id.clone()
    };

    session.portfolio_count += 1;
    tracing::debug!(user = %session.id, key = %key, "registered portfolio");
    session.saved_portfolios.insert(key.clone(), spec);
    key
}

/// Resolve a user-supplied reference to a saved portfolio.
pub fn lookup<'a>(session: &'a UserSession, reference: &str) -> Option<&'a PortfolioSpec> {
    lookup_entry(session, reference).map(|(_, spec)| spec)
}

/// Resolve a reference to the storage key and spec it names.
///
/// Tries, in order: the asset-ticker guard, exact key, case-insensitive
/// key, then a case-insensitive match on the constituent-asset set.
pub fn lookup_entry<'a>(
    session: &'a UserSession,
    reference: &str,
) -> Option<(&'a str, &'a PortfolioSpec)> {
    let reference = reference.trim();

    // A dotted reference without any portfolio indicator is an asset
    // ticker like SBER.MOEX, never a portfolio name, even if a key
    // accidentally collides.
    if reference.contains('.') && !has_portfolio_indicator(reference) {
        return None;
    }

    if let Some((key, spec)) = session.saved_portfolios.get_key_value(reference) {
        return Some((key.as_str(), spec));
    }

    let reference_lower = reference.to_lowercase();
    for (key, spec) in &session.saved_portfolios {
        if key.to_lowercase() == reference_lower {
            return Some((key.as_str(), spec));
        }
    }

    // Match by constituent-asset set, casing and order ignored
    let reference_set: HashSet<String> = split_tokens(reference)
        .iter()
        .map(|t| upper_symbol(t))
        .collect();
    if reference_set.is_empty() {
        return None;
    }

    session.saved_portfolios.iter().find_map(|(key, spec)| {
        let spec_set: HashSet<String> =
            spec.symbols.iter().map(|s| upper_symbol(s)).collect();
        (spec_set == reference_set).then_some((key.as_str(), spec))
    })
}

/// Saved portfolio keys, sorted for stable display
pub fn list_keys(session: &UserSession) -> Vec<String> {
    let mut keys: Vec<String> = session.saved_portfolios.keys().cloned().collect();
    keys.sort();
    keys
}

fn has_portfolio_indicator(reference: &str) -> bool {
    PORTFOLIO_INDICATORS
        .iter()
        .any(|indicator| reference.contains(indicator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bot_core::UserId;

    fn session_with(specs: Vec<(&str, Vec<&str>)>) -> UserSession {
        let mut session = UserSession::new(UserId(1));
        for (id, symbols) in specs {
            let n = symbols.len();
            let spec = PortfolioSpec::new(
                symbols.iter().map(|s| (*s).to_string()).collect(),
                vec![1.0 / n as f64; n],
                "USD",
                id,
            );
            register(&mut session, spec);
        }
        session
    }

    #[test]
    fn test_register_prefers_engine_id() {
        let mut session = UserSession::new(UserId(1));
        let spec = PortfolioSpec::new(vec!["A".into()], vec![1.0], "USD", "portfolio_42.PF");
        let key = register(&mut session, spec);
        assert_eq!(key, "portfolio_42.PF");
        assert_eq!(session.portfolio_count, 1);
    }

    #[test]
    fn test_register_synthesizes_counter_key() {
        let mut session = UserSession::new(UserId(1));
        let spec = PortfolioSpec::new(vec!["A".into()], vec![1.0], "USD", "");
        assert_eq!(register(&mut session, spec), "PF_1");

        let spec = PortfolioSpec::new(vec!["B".into()], vec![1.0], "USD", "");
        assert_eq!(register(&mut session, spec), "PF_2");
        assert_eq!(session.portfolio_count, 2);
    }

    #[test]
    fn test_exact_and_case_insensitive_key() {
        let session = session_with(vec![("PF_ONE", vec!["A", "B"])]);
        assert!(lookup(&session, "PF_ONE").is_some());
        assert!(lookup(&session, "pf_one").is_some());
        assert!(lookup(&session, "PF_TWO").is_none());
    }

    #[test]
    fn test_lookup_by_symbol_set_any_order_any_case() {
        // P5: permutation and casing of the constituent list both resolve
        let session = session_with(vec![("MY_PF", vec!["A", "B", "C"])]);
        assert!(lookup(&session, "A,B,C").is_some());
        assert!(lookup(&session, "c, a, b").is_some());
        assert!(lookup(&session, "B A C").is_some());
        assert!(lookup(&session, "A, B").is_none());
        assert!(lookup(&session, "A, B, C, D").is_none());
    }

    #[test]
    fn test_asset_ticker_guard() {
        // P6: a dotted ticker is never read as a portfolio name, even when
        // a key accidentally collides
        let session = session_with(vec![("SBER.MOEX", vec!["GAZP.MOEX", "LKOH.MOEX"])]);
        assert!(lookup(&session, "SBER.MOEX").is_none());
        assert!(lookup(&session, "sber.moex").is_none());
    }

    #[test]
    fn test_portfolio_indicator_allows_dotted_keys() {
        let session = session_with(vec![("portfolio_9.PF", vec!["SPY.US", "AGG.US"])]);
        assert!(lookup(&session, "PORTFOLIO_9.PF").is_some());
    }

    #[test]
    fn test_list_keys_sorted() {
        let session = session_with(vec![("B_PF", vec!["A"]), ("A_PF", vec!["B"])]);
        assert_eq!(list_keys(&session), vec!["A_PF", "B_PF"]);
    }
}
