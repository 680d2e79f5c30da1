use subcodec_core::{ChainError, CodecError};
use thiserror::Error;

/// Errors returned by contract clients.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Unexpected value in {item}: {value}")]
    UnexpectedValue { item: String, value: String },
}

impl ContractError {
    /// Returns `true` if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Chain(e) if e.is_retryable())
    }
}
