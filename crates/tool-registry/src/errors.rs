use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
