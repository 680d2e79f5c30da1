//! Error types for the SubCodec encode/decode pipeline and its collaborators.

use thiserror::Error;

/// Errors that can occur while encoding or decoding a single value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Unsupported shape: {reason}")]
    UnsupportedShape { reason: String },

    #[error("Integer overflow: magnitude needs {bits} bits, width is {width}")]
    IntegerOverflow { bits: usize, width: u16 },

    #[error("Truncated input at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("Malformed compact prefix at offset {offset}: {reason}")]
    MalformedCompactPrefix { offset: usize, reason: String },

    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    #[error("Invalid integer width: {bits} bits (must be a multiple of 8 in 8..=256)")]
    InvalidWidth { bits: u16 },

    #[error("Nesting depth exceeds limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    #[error("{count} trailing bytes after decoded value")]
    TrailingBytes { count: usize },
}

impl CodecError {
    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedShape {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedCompactPrefix {
            offset,
            reason: reason.into(),
        }
    }
}

/// Errors reported by a chain RPC client.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("RPC connection failed: {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Extrinsic rejected: {reason}")]
    Rejected { reason: String },

    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("{0}")]
    Other(String),
}

impl ChainError {
    /// Returns `true` if the failure is transient and the caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout { .. })
    }
}

/// Errors from the event watcher and its persistence layer.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Event source connection failed: {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("Event stream closed unexpectedly")]
    Closed,

    #[error("Gave up after {attempts} consecutive connection failures")]
    RetriesExhausted { attempts: u32 },

    #[error("Event store error: {0}")]
    Store(String),

    #[error("Codec error in persisted data: {0}")]
    Codec(#[from] CodecError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_error_messages() {
        let err = CodecError::TruncatedInput {
            offset: 1,
            needed: 5,
            remaining: 2,
        };
        assert_eq!(
            err.to_string(),
            "Truncated input at offset 1: needed 5 bytes, 2 remaining"
        );
        assert_eq!(
            CodecError::IntegerOverflow { bits: 65, width: 64 }.to_string(),
            "Integer overflow: magnitude needs 65 bits, width is 64"
        );
    }

    #[test]
    fn retryable_chain_errors() {
        assert!(ChainError::Timeout { ms: 10 }.is_retryable());
        assert!(!ChainError::Rejected { reason: "bad origin".into() }.is_retryable());
    }
}
