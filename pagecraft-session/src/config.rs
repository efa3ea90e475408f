use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for an edit session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long a batch commit may take before it counts as failed (ms).
    pub commit_timeout_ms: u64,
}

impl SessionConfig {
    pub fn commit_timeout(&self) -> Duration {
        Duration::from_millis(self.commit_timeout_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            commit_timeout_ms: 30_000,
        }
    }
}
