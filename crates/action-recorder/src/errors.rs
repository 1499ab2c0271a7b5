use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("cdp error: {0}")]
    Cdp(#[from] cdp_adapter::CdpError),
    #[error("malformed [BROWZER_ACTION] payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),
}

pub type RecorderResult<T> = Result<T, RecorderError>;
