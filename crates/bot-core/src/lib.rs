//! # bot-core
//!
//! Transport-agnostic chat-session plumbing for the financial-analysis bot.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     SessionStore                             │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────────┐ │
//! │  │ UserSession  │  │ PendingFlow  │  │ History (FIFO cap) │ │
//! │  │  (per user)  │──│ (tagged enum)│──│   ChatMessage      │ │
//! │  └──────────────┘  └──────────────┘  └────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is the only shared mutable state in the system. Every
//! read-modify-write of one user's session runs as a single critical
//! section under `SessionStore::with_session`.

pub mod error;
pub mod message;
pub mod session;

pub use error::{BotError, Result};
pub use message::{ChatMessage, History, MAX_HISTORY, Role};
pub use session::{
    AnalysisSummary, PendingFlow, PortfolioSpec, SessionStore, UserId, UserSession,
};
