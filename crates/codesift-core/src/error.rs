use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodeSiftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("VCS error: {0}")]
    Vcs(String),

    #[error("Segmentation error: {0}")]
    Segmentation(String),

    #[error("Operation timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid element: {0}")]
    InvalidElement(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, CodeSiftError>;
