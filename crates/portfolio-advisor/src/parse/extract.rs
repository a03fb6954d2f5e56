//! Currency and Period Extractor
//!
//! Pulls an optional currency code and relative period (e.g. "10Y") out of
//! a command's argument list, leaving the rest as symbols.

use std::collections::HashSet;

use super::tokenize::upper_symbol;

/// Result of scanning an argument list once
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extracted {
    /// Tokens that are neither currency nor period, in original order
    pub remaining: Vec<String>,

    /// First currency-code token found, uppercased
    pub currency: Option<String>,

    /// First `<digits>Y` token found, uppercased
    pub period: Option<String>,
}

/// Whether a token looks like a relative period: one or more digits
/// followed by `y`/`Y`.
fn is_period(token: &str) -> bool {
    let Some(digits) = token
        .strip_suffix('y')
        .or_else(|| token.strip_suffix('Y'))
    else {
        return false;
    };
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Scan tokens once, in order. Currency is checked first, then period; a
/// token is never counted as both. Later currency- or period-looking
/// tokens are passed through untouched (first match wins).
pub fn extract(tokens: &[String], known_currencies: &HashSet<String>) -> Extracted {
    let mut result = Extracted::default();

    for token in tokens {
        let upper = upper_symbol(token);
        if result.currency.is_none() && known_currencies.contains(&upper) {
            result.currency = Some(upper);
        } else if result.period.is_none() && is_period(token) {
            result.period = Some(upper);
        } else {
            result.remaining.push(token.clone());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn currencies() -> HashSet<String> {
        ["USD", "RUB", "EUR"].iter().map(|s| (*s).to_string()).collect()
    }

    fn extract_strs(tokens: &[&str]) -> Extracted {
        let tokens: Vec<String> = tokens.iter().map(|s| (*s).to_string()).collect();
        extract(&tokens, &currencies())
    }

    #[test]
    fn test_currency_and_period_pulled_out() {
        let result = extract_strs(&["SPY.US", "QQQ.US", "usd", "10y"]);
        assert_eq!(result.remaining, vec!["SPY.US", "QQQ.US"]);
        assert_eq!(result.currency.as_deref(), Some("USD"));
        assert_eq!(result.period.as_deref(), Some("10Y"));
    }

    #[test]
    fn test_first_currency_wins() {
        let result = extract_strs(&["USD", "A", "EUR"]);
        assert_eq!(result.currency.as_deref(), Some("USD"));
        // The second currency-looking token is left for upstream validation
        assert_eq!(result.remaining, vec!["A", "EUR"]);
    }

    #[test]
    fn test_first_period_wins() {
        let result = extract_strs(&["5Y", "A", "10Y"]);
        assert_eq!(result.period.as_deref(), Some("5Y"));
        assert_eq!(result.remaining, vec!["A", "10Y"]);
    }

    #[test]
    fn test_order_preserved() {
        let result = extract_strs(&["B", "10Y", "A"]);
        assert_eq!(result.remaining, vec!["B", "A"]);
    }

    #[test]
    fn test_period_shape() {
        assert!(is_period("10Y"));
        assert!(is_period("3y"));
        assert!(!is_period("Y"));
        assert!(!is_period("10"));
        assert!(!is_period("1OY"));
        assert!(!is_period("10YY"));
    }
}
