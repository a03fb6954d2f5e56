//! Session Management
//!
//! One `UserSession` per user id, owned by the `SessionStore`. Holds the
//! capped chat history, the pending multi-turn flow, saved portfolios, and
//! the most-recent-analysis summary.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::message::History;

/// Opaque user identifier, as assigned by the chat transport
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A saved portfolio: symbols with aligned weights and a display currency.
///
/// Immutable after creation. A changed composition is a new spec saved
/// under the same or a new key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PortfolioSpec {
    /// Asset tickers, in user-given order
    pub symbols: Vec<String>,

    /// Weights aligned with `symbols` by index, each in (0, 1]
    pub weights: Vec<f64>,

    /// Display currency code
    pub currency: String,

    /// Canonical id assigned by the financial engine, if any
    pub canonical_id: String,

    /// Human-readable description
    pub description: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl PortfolioSpec {
    pub fn new(
        symbols: Vec<String>,
        weights: Vec<f64>,
        currency: impl Into<String>,
        canonical_id: impl Into<String>,
    ) -> Self {
        debug_assert_eq!(symbols.len(), weights.len());
        let description = symbols.join(", ");
        Self {
            symbols,
            weights,
            currency: currency.into(),
            canonical_id: canonical_id.into(),
            description,
            created_at: Utc::now(),
        }
    }
}

/// Pending multi-turn flow, at most one per session.
///
/// A single tagged union instead of per-flow booleans: setting any variant
/// replaces the previous one, so mutual exclusion is structural.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum PendingFlow {
    /// No flow in progress
    #[default]
    None,

    /// `/compare` issued with too few symbols; next message supplies the rest
    AwaitingCompare {
        /// Symbols already supplied with the command, if any
        staged: Vec<String>,
    },

    /// `/portfolio` issued with no arguments; next message lists assets
    AwaitingPortfolioAssets,

    /// Assets collected; next message lists one weight per symbol
    AwaitingPortfolioWeights {
        /// Uppercased symbols staged in step one
        symbols: Vec<String>,
    },
}

impl PendingFlow {
    /// Whether any flow is in progress
    pub fn is_pending(&self) -> bool {
        !matches!(self, PendingFlow::None)
    }
}

/// Summary of the most recent successful analysis.
///
/// Only rendered into the context string shown to the user; never drives
/// routing logic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// What kind of analysis ran ("comparison", "portfolio", "info")
    pub kind: String,

    /// Assets involved
    pub assets: Vec<String>,

    /// Period, e.g. "10Y"
    pub period: Option<String>,

    /// Currency code
    pub currency: Option<String>,
}

impl AnalysisSummary {
    /// Render a one-line context string
    pub fn render(&self) -> String {
        let mut line = format!("Last {}: {}", self.kind, self.assets.join(", "));
        if let Some(currency) = &self.currency {
            line.push_str(&format!(" in {currency}"));
        }
        if let Some(period) = &self.period {
            line.push_str(&format!(" over {period}"));
        }
        line
    }
}

/// Per-user conversational state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserSession {
    /// Owner id
    pub id: UserId,

    /// Whether free text is recorded into `history`
    pub history_enabled: bool,

    /// Capped FIFO chat history for the AI fallback
    pub history: History,

    /// At most one pending multi-turn flow
    pub pending_flow: PendingFlow,

    /// Most recent successful analysis, overwritten every time
    pub last_analysis: Option<AnalysisSummary>,

    /// Saved portfolios by canonical key
    pub saved_portfolios: HashMap<String, PortfolioSpec>,

    /// Monotonic counter, fallback suffix for synthesized keys
    pub portfolio_count: u32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,
}

impl UserSession {
    /// Create a fresh session for a user
    pub fn new(id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id,
            history_enabled: true,
            history: History::new(),
            pending_flow: PendingFlow::None,
            last_analysis: None,
            saved_portfolios: HashMap::new(),
            portfolio_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Take the pending flow, leaving `None` behind.
    ///
    /// The one-step swap is what guarantees a flow handler can never leave
    /// the session stuck in an awaiting state.
    pub fn take_flow(&mut self) -> PendingFlow {
        std::mem::take(&mut self.pending_flow)
    }

    /// Enter a flow, replacing whatever was pending before
    pub fn enter_flow(&mut self, flow: PendingFlow) {
        self.pending_flow = flow;
        self.touch();
    }

    /// One-line summary of the last analysis, for prompt context
    pub fn context_summary(&self) -> String {
        self.last_analysis
            .as_ref()
            .map_or_else(|| "No analysis yet".to_string(), AnalysisSummary::render)
    }
}

/// Concurrent session store keyed by user id.
///
/// The write lock makes every read-modify-write of a single user's session
/// one critical section, which serializes concurrent messages from the same
/// user. Sessions live for the process lifetime; the host can evict with
/// `remove`.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<UserId, UserSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Shared handle
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Snapshot of one user's session, if it exists
    pub async fn get(&self, id: UserId) -> Option<UserSession> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).cloned()
    }

    /// Run a mutator against one user's session, creating it lazily.
    ///
    /// Held under the write lock for the duration of `f`.
    pub async fn with_session<R>(&self, id: UserId, f: impl FnOnce(&mut UserSession) -> R) -> R {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(id).or_insert_with(|| {
            tracing::debug!(user = %id, "creating session");
            UserSession::new(id)
        });
        let result = f(session);
        session.touch();
        result
    }

    /// Remove one user's session
    pub async fn remove(&self, id: UserId) -> Option<UserSession> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&id)
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }

    /// Check if empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ChatMessage;

    #[test]
    fn test_session_creation() {
        let session = UserSession::new(UserId(42));
        assert!(session.history_enabled);
        assert!(session.history.is_empty());
        assert_eq!(session.pending_flow, PendingFlow::None);
        assert_eq!(session.portfolio_count, 0);
    }

    #[test]
    fn test_take_flow_resets() {
        let mut session = UserSession::new(UserId(1));
        session.enter_flow(PendingFlow::AwaitingCompare {
            staged: vec!["SPY.US".into()],
        });

        let flow = session.take_flow();
        assert!(flow.is_pending());
        assert_eq!(session.pending_flow, PendingFlow::None);
    }

    #[test]
    fn test_enter_flow_replaces_previous() {
        let mut session = UserSession::new(UserId(1));
        session.enter_flow(PendingFlow::AwaitingPortfolioAssets);
        session.enter_flow(PendingFlow::AwaitingCompare { staged: vec![] });

        // Only one flow may be pending at a time
        assert_eq!(
            session.pending_flow,
            PendingFlow::AwaitingCompare { staged: vec![] }
        );
    }

    #[test]
    fn test_context_summary() {
        let mut session = UserSession::new(UserId(1));
        assert_eq!(session.context_summary(), "No analysis yet");

        session.last_analysis = Some(AnalysisSummary {
            kind: "comparison".into(),
            assets: vec!["SPY.US".into(), "QQQ.US".into()],
            period: Some("10Y".into()),
            currency: Some("USD".into()),
        });
        assert_eq!(
            session.context_summary(),
            "Last comparison: SPY.US, QQQ.US in USD over 10Y"
        );
    }

    #[tokio::test]
    async fn test_store_lazy_creation() {
        let store = SessionStore::new();
        assert!(store.get(UserId(7)).await.is_none());

        let count = store.with_session(UserId(7), |s| s.portfolio_count).await;
        assert_eq!(count, 0);
        assert!(store.get(UserId(7)).await.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_mutation_is_visible() {
        let store = SessionStore::new();
        store
            .with_session(UserId(3), |s| {
                s.history.push(ChatMessage::user("hi"));
                s.portfolio_count += 1;
            })
            .await;

        let session = store.get(UserId(3)).await.unwrap();
        assert_eq!(session.history.len(), 1);
        assert_eq!(session.portfolio_count, 1);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = SessionStore::new();
        store
            .with_session(UserId(1), |s| s.portfolio_count = 5)
            .await;
        store
            .with_session(UserId(2), |s| s.portfolio_count = 9)
            .await;

        assert_eq!(store.get(UserId(1)).await.unwrap().portfolio_count, 5);
        assert_eq!(store.get(UserId(2)).await.unwrap().portfolio_count, 9);

        store.remove(UserId(1)).await;
        assert!(store.get(UserId(1)).await.is_none());
        assert!(store.get(UserId(2)).await.is_some());
    }
}
