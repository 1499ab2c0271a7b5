//! Orchestrator-level error taxonomy.
//!
//! Every sub-crate returns `browzer_types::BrowzerError` at its own public
//! seam (§7); this module adds the handful of error conditions that only
//! exist at the orchestrator boundary (§4.10, §6), and converts outer
//! failures into `AgentExecutionResult{success:false, ...}` rather than
//! propagating a `Result` out of `executeTask`.

use thiserror::Error;

use browzer_types::BrowzerError;

#[derive(Debug, Error, Clone)]
pub enum OrchestratorError {
    /// §6: "Absence of all keys disables the orchestrator."
    #[error("no LLM provider configured: set ANTHROPIC_API_KEY or GEMINI_API_KEY (or an OpenAI-compatible equivalent)")]
    NoProviderConfigured,

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("execution not found: {0}")]
    ExecutionNotFound(String),

    #[error(transparent)]
    Engine(#[from] BrowzerError),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_provider_configured_has_a_stable_message() {
        let err = OrchestratorError::NoProviderConfigured;
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }
}
