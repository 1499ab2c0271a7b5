use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("cdp attach failed: {0}")]
    Attach(#[from] cdp_adapter::CdpError),
    #[error("dom walk script returned malformed json: {0}")]
    MalformedDomWalk(#[source] serde_json::Error),
    #[error("accessibility walk script returned malformed json: {0}")]
    MalformedA11yWalk(#[source] serde_json::Error),
}

pub type ContextResult<T> = Result<T, ContextError>;
