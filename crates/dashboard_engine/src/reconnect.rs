//! Wait times between reconnect attempts of a session.

use std::time::Duration;

/// Reconnect pacing for a session whose connection ended while still wanted.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    /// Wait before the first retry after a drop.
    pub initial_delay: Duration,
    /// Ceiling for any single wait.
    pub max_delay: Duration,
    /// Growth per consecutive failed attempt; values below 1 keep the wait flat.
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Per-session retry counter. A successful connect resets it.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: ReconnectConfig,
    attempts: u32,
}

impl Backoff {
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            attempts: 0,
        }
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Wait to apply before the next attempt; counts the attempt.
    pub fn next_wait(&mut self) -> Duration {
        let growth = self.config.multiplier.max(1.0).powi(self.attempts as i32);
        self.attempts = self.attempts.saturating_add(1);
        let cap = self.config.max_delay.as_secs_f64();
        let wait = (self.config.initial_delay.as_secs_f64() * growth).min(cap);
        Duration::from_secs_f64(wait)
    }
}
