//! Startup readiness gate settings

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backoff policy used while waiting for the run pointer file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessConfig {
    /// First delay between polls, in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Upper bound for the doubling delay, in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Give up after this many seconds (None = wait indefinitely)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_initial_delay() -> u64 {
    100
}

fn default_max_delay() -> u64 {
    5000
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            timeout_secs: None,
        }
    }
}

impl ReadinessConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms.max(1))
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms.max(self.initial_delay_ms).max(1))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Delay following `current`: doubled, capped at `max_delay`
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_delay())
    }
}
