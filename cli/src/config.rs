//! Optional YAML configuration for the CLI.
//!
//! ```yaml
//! codec:
//!   max_depth: 64
//!   trailing_bytes: allow
//! log:
//!   level: debug
//!   json: true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use subcodec_core::CodecConfig;
use subcodec_observability::LogConfig;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub codec: CodecConfig,
    #[serde(default = "default_log")]
    pub log: LogConfig,
}

/// The CLI is quiet unless asked otherwise.
fn default_log() -> LogConfig {
    LogConfig::with_level("warn")
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            codec: CodecConfig::default(),
            log: default_log(),
        }
    }
}

impl CliConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file '{}'", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("invalid config file '{}'", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subcodec_core::TrailingBytes;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = CliConfig::from_yaml("codec:\n  trailing_bytes: allow\n").unwrap();
        assert_eq!(config.codec.trailing_bytes, TrailingBytes::Allow);
        assert_eq!(config.codec.max_depth, CodecConfig::default().max_depth);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn log_section() {
        let config = CliConfig::from_yaml("log:\n  level: debug\n  json: true\n").unwrap();
        assert_eq!(config.log.level, "debug");
        assert!(config.log.json);
    }

    #[test]
    fn no_path_means_defaults() {
        let config = CliConfig::load(None).unwrap();
        assert_eq!(config.codec, CodecConfig::default());
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn bad_yaml_is_an_error() {
        assert!(CliConfig::from_yaml("codec: [1, 2]").is_err());
    }
}
