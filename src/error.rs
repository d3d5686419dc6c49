//! Error types for neo-explorer.
//!
//! Defines the main error enum used throughout the crate and the
//! [`ErrorKind`] taxonomy carried by failed execution outcomes.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Main error type for neo-explorer operations.
#[derive(Error, Debug)]
pub enum NeoError {
    /// The requested catalog entry does not exist.
    #[error("Unknown query id: {0}")]
    UnknownQueryId(String),

    /// Store connection errors (host unreachable, auth failed, missing file, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement errors reported by the store (syntax, missing table, type mismatch, etc.)
    #[error("Statement error: {0}")]
    Statement(String),

    /// A caller-supplied deadline elapsed before the store responded.
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    /// Configuration errors (invalid config file, bad connection string, etc.)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl NeoError {
    /// Creates an unknown query id error.
    pub fn unknown_query_id(id: impl Into<String>) -> Self {
        Self::UnknownQueryId(id.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a statement error with the given message.
    pub fn statement(msg: impl Into<String>) -> Self {
        Self::Statement(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The message without its category prefix, for reports that print
    /// the category separately.
    pub fn detail(&self) -> String {
        match self {
            Self::UnknownQueryId(id) => format!("no catalog entry named '{id}'"),
            Self::Connection(msg) | Self::Statement(msg) | Self::Config(msg) => msg.clone(),
            Self::Timeout(deadline) => format!("no response within {deadline:?}"),
        }
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        self.kind().label()
    }

    /// Returns the execution failure kind this error maps to.
    ///
    /// Configuration problems can only surface while opening a connection,
    /// so they are reported as connection failures.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownQueryId(_) => ErrorKind::UnknownQueryId,
            Self::Connection(_) | Self::Config(_) => ErrorKind::Connection,
            Self::Statement(_) => ErrorKind::Statement,
            Self::Timeout(_) => ErrorKind::Timeout,
        }
    }
}

/// Classification of a failed execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownQueryId,
    Connection,
    Statement,
    Timeout,
}

impl ErrorKind {
    /// Human-readable label for banners and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnknownQueryId => "Unknown Query",
            Self::Connection => "Connection Error",
            Self::Statement => "Statement Error",
            Self::Timeout => "Timeout",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result type alias using NeoError.
pub type Result<T> = std::result::Result<T, NeoError>;
