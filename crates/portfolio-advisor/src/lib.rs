//! # portfolio-advisor
//!
//! Conversational core of the financial-analysis bot: tolerant parsing of
//! loosely-formatted portfolio specs, fuzzy resolution of saved-portfolio
//! references, and per-user multi-turn command routing.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  ConversationRouter                           │
//! │  ┌───────────┐  ┌───────────┐  ┌──────────┐  ┌────────────┐  │
//! │  │  parse    │  │ registry  │  │ resolver │  │  engine    │  │
//! │  │ tokenize/ │──│ register/ │──│ expand + │──│ (Strategy) │  │
//! │  │ weights   │  │  lookup   │  │  dedup   │  │            │  │
//! │  └───────────┘  └───────────┘  └──────────┘  └────────────┘  │
//! └──────────────────────────┬───────────────────────────────────┘
//!                            │
//!                   bot-core SessionStore
//! ```
//!
//! The `PortfolioEngine` trait keeps the external analytics library
//! swappable; the core never talks to the network itself. The transport
//! layer feeds messages into `ConversationRouter::handle_command` /
//! `handle_free_text` and acts on the returned `Action`.

pub mod engine;
pub mod error;
pub mod model;
pub mod parse;
pub mod registry;
pub mod resolver;
pub mod router;

pub use engine::{ConstructedPortfolio, MockPortfolioEngine, PortfolioEngine};
pub use error::{AdvisorError, Result};
pub use model::{AdvisorConfig, ComparisonRequest, ExpandedSymbol, PortfolioContext};
pub use parse::{ParseResult, WeightParser};
pub use router::{Action, ConversationRouter, Execution};
