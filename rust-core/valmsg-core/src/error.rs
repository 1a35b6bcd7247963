//! # Error Handling
//!
//! Centralized error types for valmsg.
//! Uses `thiserror` for ergonomic error definitions.

use crate::report::ErrorReport;
use std::any::Any;
use thiserror::Error;

/// Result type alias for valmsg operations
pub type Result<T> = std::result::Result<T, Error>;

/// Outcomes of validating a record, plus catalog loading failures
#[derive(Error, Debug)]
pub enum Error {
    /// One or more rules failed; the report carries the messages per field
    #[error(transparent)]
    ValidationFailed(ErrorReport),

    /// The rule engine could not evaluate the record at all
    #[error("Validation engine fault: {0}")]
    EngineFault(#[from] EngineFault),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON input could not be parsed
    #[error("JSON parse error: {reason}")]
    Parse {
        /// Parser message
        reason: String,
    },
}

impl Error {
    /// The error report, if this is a validation failure
    #[must_use]
    pub const fn report(&self) -> Option<&ErrorReport> {
        match self {
            Self::ValidationFailed(report) => Some(report),
            _ => None,
        }
    }
}

/// Opaque failure raised by a rule engine
///
/// Propagated unchanged by the validation entry point; it indicates an
/// integration bug rather than bad input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineFault {
    message: String,
}

impl EngineFault {
    /// Create a fault with a description
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Convert a caught panic payload into a fault
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            format!("rule engine panicked: {s}")
        } else if let Some(s) = payload.downcast_ref::<String>() {
            format!("rule engine panicked: {s}")
        } else {
            "rule engine panicked".to_string()
        };
        Self { message }
    }

    /// Fault description
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
