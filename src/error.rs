//! Error types for the Jaeger Storage Operator
//!
//! Provides structured error types for manifest building, storage wiring
//! and the rendering front end.

use thiserror::Error;

/// Unified error type for the operator
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing required field: {kind}.{field}")]
    MissingField { kind: String, field: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Serialization Errors
    // =========================================================================
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Action the reconciler should take when a build step fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Requeue with exponential backoff
    RequeueWithBackoff,
    /// Don't requeue, wait for the owning resource to change
    NoRequeue,
}

impl Error {
    /// Determine what action to take for this error
    pub fn action(&self) -> ErrorAction {
        match self {
            // The owning resource is wrong; retrying cannot help until it is edited
            Error::InvalidArgument(_)
            | Error::MissingField { .. }
            | Error::Configuration(_)
            | Error::Yaml(_)
            | Error::Json(_) => ErrorAction::NoRequeue,

            Error::Io(_) => ErrorAction::RequeueWithBackoff,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        !matches!(self.action(), ErrorAction::NoRequeue)
    }

    /// Shorthand for a missing metadata or spec field
    pub fn missing(kind: impl Into<String>, field: impl Into<String>) -> Self {
        Error::MissingField {
            kind: kind.into(),
            field: field.into(),
        }
    }
}

/// Result type alias for the operator
pub type Result<T> = std::result::Result<T, Error>;
