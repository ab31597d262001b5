//! Shared API response types
//!
//! Request handlers translate [`Error`] values into these bodies. The core never
//! formats user-facing output itself.

use serde::Serialize;
use serde_json::{json, Value};

use crate::Error;

/// Error response body
///
/// # Examples
///
/// ```
/// use t2k_common::api::ErrorResponse;
/// use t2k_common::Error;
///
/// let err = Error::InsufficientResults { requested: 5, available: 2 };
/// let body = ErrorResponse::from_error(&err);
///
/// assert_eq!(body.error, "insufficient_results");
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    /// Create new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Create error response with details
    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
        }
    }

    /// Build the response body for a library error
    ///
    /// Load failures keep the dataset path out of the body; it is logged
    /// server-side instead.
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::InsufficientResults { requested, available } => Self::with_details(
                err.kind(),
                "Not enough songs available.",
                json!({ "requested": requested, "available": available }),
            ),
            Error::LoadFailure { .. } | Error::Config(_) => {
                Self::new(err.kind(), "Internal server error")
            }
            Error::InvalidInput(_) => Self::new(err.kind(), err.to_string()),
        }
    }
}
