//! Tracing / logging initialisation helpers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log level per component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component: crate name → level
    #[serde(default)]
    pub components: BTreeMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: BTreeMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Config with only the global level set.
    pub fn with_level(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }
}

/// Build the `EnvFilter` directive string: `"info,subcodec_stream=debug"` etc.
pub fn build_directives(config: &LogConfig) -> String {
    let mut directives = config.level.clone();
    for (component, level) in &config.components {
        directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
    }
    directives
}

/// Initialise tracing with the given log config.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
/// Returns an error if a global subscriber is already installed.
pub fn try_init_tracing(config: &LogConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_new(build_directives(config)).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    }
}

/// Initialise tracing once at application startup.
/// A second call is a no-op.
pub fn init_tracing(config: &LogConfig) {
    let _ = try_init_tracing(config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_include_components() {
        let mut config = LogConfig::with_level("warn");
        config.components.insert("subcodec-stream".into(), "debug".into());
        config.components.insert("subcodec-core".into(), "trace".into());
        assert_eq!(
            build_directives(&config),
            "warn,subcodec_core=trace,subcodec_stream=debug"
        );
    }

    #[test]
    fn config_defaults() {
        let config: LogConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LogConfig::default());
        assert_eq!(build_directives(&config), "info");
    }

    #[test]
    fn second_init_is_harmless() {
        init_tracing(&LogConfig::default());
        init_tracing(&LogConfig::default());
    }
}
