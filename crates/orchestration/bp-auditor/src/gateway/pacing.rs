//! Fixed-interval pacing of gateway calls.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Configuration for request pacing.
#[derive(Debug, Clone)]
pub struct PacingConfig {
    /// Minimum gap between the start of two gateway calls, in milliseconds.
    /// Zero disables pacing.
    pub min_interval_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 250,
        }
    }
}

impl PacingConfig {
    /// Create a pacing configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum interval in milliseconds.
    pub fn with_min_interval_ms(mut self, min_interval_ms: u64) -> Self {
        self.min_interval_ms = min_interval_ms;
        self
    }

    /// No pacing at all.
    pub fn disabled() -> Self {
        Self { min_interval_ms: 0 }
    }

    /// The interval as a duration.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

/// Spaces call starts at least `min_interval_ms` apart, shared by all tasks.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Pacer {
    /// Create a pacer from its configuration.
    pub fn new(config: &PacingConfig) -> Self {
        Self {
            interval: config.interval(),
            next_slot: Mutex::new(None),
        }
    }

    /// Wait until the next call slot is free and reserve it.
    pub async fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }

        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(at) if at > now => at,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot
        };

        sleep_until(slot).await;
    }
}
