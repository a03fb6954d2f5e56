//! Tokenizer and Normalizer
//!
//! Pure, total text helpers shared by every command parser. Unparseable
//! input never panics here; it simply yields more tokens than expected and
//! is rejected downstream.

/// Replace every comma that sits between two digits with a decimal point.
///
/// Commas used as list separators are left untouched, so `"A:0,3, B:0,7"`
/// becomes `"A:0.3, B:0.7"`.
pub fn normalize_weight_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        let between_digits = c == ','
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).is_some_and(char::is_ascii_digit);
        out.push(if between_digits { '.' } else { c });
    }

    out
}

/// Split raw text into candidate tokens.
///
/// Splits on commas first, trims each piece, drops empties. A piece that
/// contains whitespace but no `:` is split again on whitespace, so
/// `"A, B"`, `"A B"`, and `"A:0.3, B"` all tokenize the same way.
pub fn split_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for piece in text.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        if piece.contains(char::is_whitespace) && !piece.contains(':') {
            tokens.extend(piece.split_whitespace().map(str::to_string));
        } else {
            tokens.push(piece.to_string());
        }
    }

    tokens
}

/// Trim and upper-case a ticker-like token
pub fn upper_symbol(s: &str) -> String {
    s.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_commas_normalized() {
        assert_eq!(normalize_weight_commas("A:0,3, B:0,7"), "A:0.3, B:0.7");
    }

    #[test]
    fn test_separator_commas_untouched() {
        assert_eq!(normalize_weight_commas("SPY.US, QQQ.US"), "SPY.US, QQQ.US");
        // Comma followed by a space is a separator even after a digit
        assert_eq!(normalize_weight_commas("A:0.3, B"), "A:0.3, B");
    }

    #[test]
    fn test_split_on_commas() {
        assert_eq!(split_tokens("A, B, C"), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_split_on_whitespace() {
        assert_eq!(split_tokens("A B C"), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_mixed_separators() {
        assert_eq!(
            split_tokens("A:0.3, B C"),
            vec!["A:0.3", "B", "C"]
        );
    }

    #[test]
    fn test_empty_pieces_dropped() {
        assert_eq!(split_tokens("A,, ,B"), vec!["A", "B"]);
        assert!(split_tokens("   ").is_empty());
    }

    #[test]
    fn test_upper_symbol() {
        assert_eq!(upper_symbol("  sber.moex "), "SBER.MOEX");
    }
}
