//! Input Parsing
//!
//! Shared tokenization, weight parsing, and currency/period extraction.
//! Every command parser is a thin caller of these primitives.

mod extract;
mod tokenize;
mod weights;

pub use extract::{Extracted, extract};
pub use tokenize::{normalize_weight_commas, split_tokens, upper_symbol};
pub use weights::{NORMALIZE_TOLERANCE, ParseResult, WeightParser};
