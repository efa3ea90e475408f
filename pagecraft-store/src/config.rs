use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the content store client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// How long a single page read may take before it counts as failed (ms).
    pub fetch_timeout_ms: u64,
}

impl StoreConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
        }
    }
}
