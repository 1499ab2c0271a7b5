//! Unified error type for the agentic execution engine.
//!
//! Every crate in the workspace returns `BrowzerResult<T>` at its public
//! seams; leaf errors are converted into the appropriate variant here
//! rather than boxed, so callers can match on taxonomy (§7 of the design).

use thiserror::Error;

/// Error taxonomy shared across the core engine.
///
/// Variants line up with the categories enumerated in the error-handling
/// design: LLM-provider errors, tool errors, context-extraction errors,
/// recorder errors and orchestrator-level errors all resolve to one of
/// these, with `retryable()` capturing which ones a caller should back off
/// and retry.
#[derive(Debug, Error, Clone)]
pub enum BrowzerError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limited: {0}")]
    RateLimit(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("timed out after {operation}: {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("tool-calling error: {0}")]
    ToolCalling(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {message} ({details})")]
    Validation { message: String, details: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl BrowzerError {
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    pub fn validation(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: details.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Whether a retry loop should back off and try again.
    ///
    /// Mirrors §4.6/§7: rate-limit, network, timeout and generic stream
    /// errors are retryable; authentication, invalid-request and
    /// tool-calling errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit(_) | Self::Network(_) | Self::Timeout { .. } | Self::Stream(_)
        )
    }
}

impl From<std::io::Error> for BrowzerError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(format!("IO error: {err}"))
    }
}

impl From<serde_json::Error> for BrowzerError {
    fn from(err: serde_json::Error) -> Self {
        Self::validation("invalid JSON", err.to_string())
    }
}

pub type BrowzerResult<T> = Result<T, BrowzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(BrowzerError::RateLimit("slow down".into()).is_retryable());
        assert!(BrowzerError::timeout("llm completion", 5000).is_retryable());
        assert!(!BrowzerError::Authentication("bad key".into()).is_retryable());
        assert!(!BrowzerError::InvalidRequest("bad schema".into()).is_retryable());
    }

    #[test]
    fn display_carries_message() {
        let err = BrowzerError::not_found("session abc");
        assert_eq!(err.to_string(), "not found: session abc");
    }
}
