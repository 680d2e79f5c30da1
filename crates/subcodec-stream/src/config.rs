//! Event watcher configuration.

use serde::{Deserialize, Serialize};

/// Configuration for one watched contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Contract the events belong to; namespaces the persisted state.
    pub contract_address: String,
    /// Consecutive connection failures tolerated before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial reconnect backoff in milliseconds; doubles per failure
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Upper bound on the reconnect backoff
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_max_retries() -> u32 { 5 }
fn default_backoff_ms() -> u64 { 500 }
fn default_max_backoff_ms() -> u64 { 30_000 }

impl WatcherConfig {
    pub fn new(contract_address: impl Into<String>) -> Self {
        Self {
            contract_address: contract_address.into(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }

    /// Delay before reconnect attempt number `failures` (1-based).
    pub fn backoff(&self, failures: u32) -> std::time::Duration {
        let exp = failures.saturating_sub(1).min(16);
        let ms = self
            .backoff_ms
            .saturating_mul(1u64 << exp)
            .min(self.max_backoff_ms);
        std::time::Duration::from_millis(ms)
    }
}
