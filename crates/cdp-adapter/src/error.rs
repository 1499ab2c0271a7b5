use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum CdpError {
    #[error("debugger not attached to page")]
    NotAttached,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("command {method} failed: {message}")]
    CommandFailed { method: String, message: String },
    #[error("response for {method} could not be decoded: {0}", method = .method)]
    Decode { method: String, source: String },
    #[error("timed out waiting for {0}")]
    Timeout(String),
}

pub type CdpResult<T> = Result<T, CdpError>;
