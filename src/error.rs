//! Error types for Courier.
//!
//! Defines the main error enum used throughout the crate.
//!
//! Policy-gate outcomes (blocked, approval required) are deliberately not
//! errors; they are ordinary values of [`crate::coordinator::ExecutionOutcome`].
//! This enum covers the failures that prevent an outcome from existing at all.

use thiserror::Error;

/// Main error type for Courier operations.
#[derive(Error, Debug)]
pub enum CourierError {
    /// The session was already marked destroyed locally; no network call was made.
    #[error("Session destroyed: {0}")]
    SessionDestroyed(String),

    /// Network or protocol failure while talking to the remote session.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration errors (invalid config file, bad polling tunables, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal coordinator errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CourierError {
    /// Creates a destroyed-session error with the given message.
    pub fn session_destroyed(msg: impl Into<String>) -> Self {
        Self::SessionDestroyed(msg.into())
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::SessionDestroyed(_) => "Session Destroyed",
            Self::Transport(_) => "Transport Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using CourierError.
pub type Result<T> = std::result::Result<T, CourierError>;
