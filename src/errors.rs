//! Error types for the gap audit engine

use thiserror::Error;

/// Main error type for audit operations
#[derive(Error, Debug)]
pub enum AuditError {
    /// Configuration rejected before any processing started
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input record missing a required field; skipped by the aggregator
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Reasoning-service failure; contained per gap, never fatal to a run
    #[error("Reasoning service error: {0}")]
    Service(#[from] ServiceError),

    /// Serialization/deserialization errors at the delivery boundary
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures from the external reasoning service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Quota exhausted")]
    QuotaExhausted,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ServiceError {
    /// Transient failures are worth retrying; quota and malformed
    /// responses are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Timeout(_) | ServiceError::Transport(_))
    }
}

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;
