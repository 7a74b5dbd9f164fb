use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid code: {0:?} has no letters or digits")]
    InvalidCode(String),
    #[error("invalid ranked result: {0}")]
    InvalidResult(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
