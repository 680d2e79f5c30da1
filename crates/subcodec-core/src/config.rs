//! Codec configuration.

use serde::{Deserialize, Serialize};

/// Default container nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// What a top-level decode does with bytes left over after the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingBytes {
    /// Fail with `TrailingBytes`.
    #[default]
    Reject,
    /// Ignore them.
    Allow,
}

/// Limits and policies applied by the encoder and decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Maximum container nesting depth for values and shapes.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Trailing-byte policy for `decode_with`.
    #[serde(default)]
    pub trailing_bytes: TrailingBytes,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            trailing_bytes: TrailingBytes::Reject,
        }
    }
}

impl CodecConfig {
    /// Default limits, ignoring trailing bytes.
    pub fn lenient() -> Self {
        Self {
            trailing_bytes: TrailingBytes::Allow,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_json() {
        let config: CodecConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CodecConfig::default());
    }

    #[test]
    fn trailing_bytes_serde() {
        let config: CodecConfig =
            serde_json::from_str(r#"{"max_depth": 8, "trailing_bytes": "allow"}"#).unwrap();
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.trailing_bytes, TrailingBytes::Allow);
    }
}
