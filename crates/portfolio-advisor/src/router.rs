//! Conversation Router
//!
//! Decides whether an incoming message is a direct command, the
//! continuation of a pending multi-turn flow, or free text for the AI
//! fallback. All session state goes through `SessionStore::with_session`,
//! and a pending flow is taken (and thereby cleared) before its handler
//! runs, so no handler outcome can leave a session stuck.

use std::sync::Arc;

use bot_core::{AnalysisSummary, ChatMessage, PendingFlow, PortfolioSpec, SessionStore, UserId};

use crate::engine::PortfolioEngine;
use crate::error::{AdvisorError, Result};
use crate::model::{AdvisorConfig, ComparisonRequest};
use crate::parse::{Extracted, WeightParser, extract, normalize_weight_commas, split_tokens, upper_symbol};
use crate::registry;
use crate::resolver;

/// What the transport layer should do with a handled message
#[derive(Clone, Debug)]
pub enum Action {
    /// Run a resolved request against the analytics/report layers
    Execute(Execution),

    /// Ask the user for more input (a flow may now be pending)
    Prompt(String),

    /// Hand the text to the external AI fallback
    Fallback(String),

    /// Report a failure to the user
    Error(String),
}

/// A fully resolved, executable request
#[derive(Clone, Debug)]
pub enum Execution {
    /// Multi-asset comparison
    Compare(ComparisonRequest),

    /// Single-asset (or small) info request
    Info(ComparisonRequest),

    /// A portfolio was constructed and saved
    PortfolioSaved { key: String, spec: PortfolioSpec },
}

/// Top-level per-message orchestrator
pub struct ConversationRouter {
    store: Arc<SessionStore>,
    engine: Arc<dyn PortfolioEngine>,
    parser: WeightParser,
    config: AdvisorConfig,
}

impl ConversationRouter {
    pub fn new(
        store: Arc<SessionStore>,
        engine: Arc<dyn PortfolioEngine>,
        config: AdvisorConfig,
    ) -> Self {
        let parser = WeightParser::with_tolerance(config.normalize_tolerance);
        Self {
            store,
            engine,
            parser,
            config,
        }
    }

    /// Handle a direct command such as `/compare` or `/portfolio`.
    pub async fn handle_command(&self, user: UserId, name: &str, args: &[String]) -> Action {
        let name = name.trim_start_matches('/').to_lowercase();
        let result = match name.as_str() {
            "compare" => self.compare_command(user, args).await,
            "portfolio" => self.portfolio_command(user, args).await,
            "info" => self.info_command(user, args).await,
            _ => Err(AdvisorError::UnknownCommand(name.clone())),
        };
        result.unwrap_or_else(|err| Action::Error(err.user_message()))
    }

    /// Handle a plain text message.
    ///
    /// A pending flow is cleared before its handler is invoked, so the
    /// session always returns to idle no matter how the handler ends.
    pub async fn handle_free_text(&self, user: UserId, text: &str) -> Action {
        let flow = self
            .store
            .with_session(user, bot_core::UserSession::take_flow)
            .await;

        let result = match flow {
            PendingFlow::None => {
                let text = text.to_string();
                self.store
                    .with_session(user, |session| {
                        if session.history_enabled {
                            session.history.push(ChatMessage::user(&text));
                        }
                    })
                    .await;
                return Action::Fallback(text);
            }
            PendingFlow::AwaitingCompare { staged } => {
                let mut tokens = staged;
                tokens.extend(tokenize(text));
                self.compare_with_tokens(user, tokens).await
            }
            PendingFlow::AwaitingPortfolioAssets => self.portfolio_assets_step(user, text).await,
            PendingFlow::AwaitingPortfolioWeights { symbols } => {
                self.portfolio_weights_step(user, &symbols, text).await
            }
        };

        result.unwrap_or_else(|err| Action::Error(err.user_message()))
    }

    async fn compare_command(&self, user: UserId, args: &[String]) -> Result<Action> {
        let tokens = tokenize_args(args);
        let extracted = extract(&tokens, &self.config.known_currencies);

        if extracted.remaining.len() < 2 {
            self.store
                .with_session(user, |session| {
                    session.enter_flow(PendingFlow::AwaitingCompare {
                        staged: extracted.remaining.clone(),
                    });
                })
                .await;
            return Ok(Action::Prompt(
                "Which assets should I compare? Send at least two tickers, \
                 e.g. SPY.US, QQQ.US"
                    .into(),
            ));
        }

        self.resolve_comparison(user, extracted, "comparison")
            .await
            .map(|request| Action::Execute(Execution::Compare(request)))
    }

    async fn compare_with_tokens(&self, user: UserId, tokens: Vec<String>) -> Result<Action> {
        let extracted = extract(&tokens, &self.config.known_currencies);
        if extracted.remaining.len() < 2 {
            return Err(AdvisorError::InvalidInput(
                "I need at least two assets to compare".into(),
            ));
        }

        self.resolve_comparison(user, extracted, "comparison")
            .await
            .map(|request| Action::Execute(Execution::Compare(request)))
    }

    async fn info_command(&self, user: UserId, args: &[String]) -> Result<Action> {
        let tokens = tokenize_args(args);
        let extracted = extract(&tokens, &self.config.known_currencies);

        if extracted.remaining.is_empty() {
            return Ok(Action::Prompt(
                "Which asset are you interested in? Send a ticker, e.g. SPY.US".into(),
            ));
        }

        self.resolve_comparison(user, extracted, "info")
            .await
            .map(|request| Action::Execute(Execution::Info(request)))
    }

    /// Resolve references and record the last-analysis summary, all inside
    /// one per-user critical section.
    async fn resolve_comparison(
        &self,
        user: UserId,
        extracted: Extracted,
        kind: &str,
    ) -> Result<ComparisonRequest> {
        let kind = kind.to_string();
        let config = self.config.clone();
        self.store
            .with_session(user, move |session| {
                let mut request = resolver::resolve(session, &extracted.remaining, &config)?;
                request.currency = extracted.currency.clone();
                request.period = extracted.period.clone();
                session.last_analysis = Some(AnalysisSummary {
                    kind,
                    assets: request.clean_symbols.clone(),
                    period: extracted.period,
                    currency: extracted.currency,
                });
                Ok(request)
            })
            .await
    }

    async fn portfolio_command(&self, user: UserId, args: &[String]) -> Result<Action> {
        if args.iter().all(|a| a.trim().is_empty()) {
            self.store
                .with_session(user, |session| {
                    session.enter_flow(PendingFlow::AwaitingPortfolioAssets);
                })
                .await;
            return Ok(Action::Prompt(
                "Which assets should the portfolio hold? Send tickers with \
                 optional weights, e.g. SPY.US:0.6, AGG.US:0.4"
                    .into(),
            ));
        }

        self.create_portfolio(user, tokenize_args(args)).await
    }

    /// First step of the two-step portfolio flow: a symbols-only message
    /// stages the symbols and asks for weights; anything with a `:` is
    /// treated as a complete spec.
    async fn portfolio_assets_step(&self, user: UserId, text: &str) -> Result<Action> {
        if text.contains(':') {
            return self.create_portfolio(user, tokenize(text)).await;
        }

        let symbols: Vec<String> = tokenize(text).iter().map(|t| upper_symbol(t)).collect();
        if symbols.is_empty() {
            return Err(AdvisorError::InvalidInput("Empty input".into()));
        }

        let prompt = format!(
            "Got {} assets: {}. Now send {} weights summing to 1, \
             e.g. 0.5, 0.3, 0.2",
            symbols.len(),
            symbols.join(", "),
            symbols.len()
        );
        self.store
            .with_session(user, |session| {
                session.enter_flow(PendingFlow::AwaitingPortfolioWeights { symbols });
            })
            .await;
        Ok(Action::Prompt(prompt))
    }

    /// Second step: one weight per staged symbol.
    async fn portfolio_weights_step(
        &self,
        user: UserId,
        symbols: &[String],
        text: &str,
    ) -> Result<Action> {
        let weights = self.parser.parse_weight_list(text, symbols.len())?;
        self.save_portfolio(user, symbols.to_vec(), weights, None)
            .await
    }

    /// Parse a full `SYM:W` spec, construct it via the engine, and register
    /// it in the user's session.
    async fn create_portfolio(&self, user: UserId, tokens: Vec<String>) -> Result<Action> {
        let extracted = extract(&tokens, &self.config.known_currencies);

        let parsed = self.parser.parse(&extracted.remaining.join(", "));
        if !parsed.ok {
            // Parser diagnostics already carry a usage example
            return Ok(Action::Error(parsed.diagnostics.join("\n")));
        }
        for diagnostic in &parsed.diagnostics {
            tracing::debug!(user = %user, "{diagnostic}");
        }

        self.save_portfolio(user, parsed.symbols(), parsed.weights(), extracted.currency)
            .await
    }

    async fn save_portfolio(
        &self,
        user: UserId,
        symbols: Vec<String>,
        weights: Vec<f64>,
        currency: Option<String>,
    ) -> Result<Action> {
        let currency = currency.unwrap_or_else(|| self.config.default_currency.clone());

        let constructed = self
            .engine
            .construct_portfolio(&symbols, &weights, &currency)
            .await?;

        let spec = PortfolioSpec::new(
            symbols,
            weights,
            &currency,
            constructed.canonical_id.unwrap_or_default(),
        );

        let (key, spec) = self
            .store
            .with_session(user, move |session| {
                let key = registry::register(session, spec.clone());
                session.last_analysis = Some(AnalysisSummary {
                    kind: "portfolio".into(),
                    assets: spec.symbols.clone(),
                    period: None,
                    currency: Some(spec.currency.clone()),
                });
                (key, spec)
            })
            .await;

        Ok(Action::Execute(Execution::PortfolioSaved { key, spec }))
    }
}

/// Normalize decimal commas, then split into tokens
fn tokenize(text: &str) -> Vec<String> {
    split_tokens(&normalize_weight_commas(text))
}

/// Command args arrive pre-split by the transport. Tokenize each arg on
/// its own so a `SYM:W` arg is never glued to its neighbor by the
/// colon-preserving whitespace rule.
fn tokenize_args(args: &[String]) -> Vec<String> {
    args.iter().flat_map(|arg| tokenize(arg)).collect()
}
