//! Common error types for T2K

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for T2K operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across T2K crates
#[derive(Error, Debug)]
pub enum Error {
    /// Dataset missing, unreadable or malformed.
    ///
    /// Never cached: the next catalog access retries the load.
    #[error("Failed to load catalog from {}: {reason}", path.display())]
    LoadFailure { path: PathBuf, reason: String },

    /// Fewer eligible songs than requested
    #[error("Not enough songs available: requested {requested}, {available} eligible")]
    InsufficientResults { requested: usize, available: usize },

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn load_failure(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::LoadFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Stable identifier used in error response bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Error::LoadFailure { .. } => "load_failure",
            Error::InsufficientResults { .. } => "insufficient_results",
            Error::InvalidInput(_) => "invalid_input",
            Error::Config(_) => "config",
        }
    }

    /// HTTP status a request handler should answer with
    ///
    /// `InsufficientResults` is an expected "not found" outcome, load and
    /// configuration problems are server faults.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InsufficientResults { .. } => 404,
            Error::InvalidInput(_) => 400,
            Error::LoadFailure { .. } | Error::Config(_) => 500,
        }
    }
}
