//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`HomeWatchError`] via `From`. Controllers never let these escape a tick;
//! they are logged and the tick is abandoned.

/// Base error for every fallible port operation.
#[derive(Debug, thiserror::Error)]
pub enum HomeWatchError {
    /// The backing store failed (file system, database, ...).
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A persisted value could not be understood.
    #[error("invalid token")]
    Token(#[from] ParseTokenError),
}

/// A channel held text that is not a valid token for its kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {kind} token {token:?}")]
pub struct ParseTokenError {
    /// What was being parsed (e.g. `"lock status"`).
    pub kind: &'static str,
    /// The rejected text, trimmed.
    pub token: String,
}

impl ParseTokenError {
    #[must_use]
    pub fn new(kind: &'static str, token: &str) -> Self {
        Self {
            kind,
            token: token.trim().to_string(),
        }
    }
}
