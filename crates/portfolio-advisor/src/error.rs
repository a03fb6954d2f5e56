//! Error Types for the Portfolio Advisor

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Malformed or empty user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A weight could not be parsed or is out of range
    #[error("Invalid weight for {symbol}: {detail}")]
    InvalidWeight { symbol: String, detail: String },

    /// Exactly two identical assets supplied to a comparison
    #[error("Cannot compare {0} with itself")]
    DuplicateAssets(String),

    /// A portfolio reference matched nothing
    #[error("Portfolio not found: {0}")]
    PortfolioNotFound(String),

    /// The financial engine rejected a construction request
    #[error("Engine error: {0}")]
    Engine(String),

    /// Unknown command name
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Session-layer failure
    #[error("Session error: {0}")]
    Session(#[from] bot_core::BotError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdvisorError {
    /// Convert to a user-facing message with a corrective example where
    /// one helps.
    pub fn user_message(&self) -> String {
        match self {
            AdvisorError::InvalidInput(msg) => {
                format!("{msg}\n\nExample: SPY.US:0.5, AGG.US:0.5")
            }
            AdvisorError::InvalidWeight { symbol, detail } => {
                format!(
                    "The weight for {symbol} is not valid: {detail}.\n\n\
                     Weights must be numbers between 0 and 1, e.g. {symbol}:0.4"
                )
            }
            AdvisorError::DuplicateAssets(symbol) => {
                format!("You must compare different assets, but {symbol} was given twice.")
            }
            AdvisorError::PortfolioNotFound(reference) => {
                format!(
                    "No saved portfolio matches '{reference}'. \
                     Create one with /portfolio first."
                )
            }
            AdvisorError::Engine(_) => {
                "The analysis engine could not process that request. Please try again.".into()
            }
            AdvisorError::UnknownCommand(name) => format!("Unknown command: /{name}"),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
