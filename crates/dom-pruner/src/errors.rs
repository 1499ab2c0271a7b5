//! Error type kept for API uniformity with the rest of the workspace.
//!
//! Pruning never throws (§4.1 edge cases): any internal failure collapses to
//! an empty element set with zero stats instead of propagating an error. This
//! type exists so callers that want to distinguish "found nothing" from
//! "failed" still have somewhere to put that, and so the crate matches the
//! `thiserror` shape used everywhere else in the workspace.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PruneError {
    #[error("dom traversal exceeded the configured depth bound")]
    DepthExceeded,
    #[error("input document was empty")]
    EmptyDocument,
}

pub type PruneResult<T> = Result<T, PruneError>;
