//! Conversation Messages
//!
//! Chat history kept per user for the AI fallback, capped FIFO.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default cap on stored messages per user
pub const MAX_HISTORY: usize = 20;

/// Role of a message sender
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input
    User,
    /// Assistant (LLM) response
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in the per-user history
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role
    pub role: Role,

    /// Text content
    pub text: String,

    /// Timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new message
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }
}

/// Capped conversation history
///
/// Oldest messages are dropped first once the cap is reached.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct History {
    messages: Vec<ChatMessage>,

    /// Maximum number of retained messages
    #[serde(default = "default_max_len")]
    max_len: usize,
}

fn default_max_len() -> usize {
    MAX_HISTORY
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }

    /// Create with a custom cap
    pub fn with_capacity(max_len: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_len,
        }
    }

    /// Append a message, evicting the oldest while over the cap
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        while self.messages.len() > self.max_len {
            self.messages.remove(0);
        }
    }

    /// Get all messages, oldest first
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Get the last message
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Drop all messages
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
