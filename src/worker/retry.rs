//! Retry and backoff policy for page loads

use crate::config::RetryConfig;
use rand::Rng;
use std::time::Duration;

/// How often, and how patiently, a worker retries an empty load
///
/// The base delay is a whole number of seconds drawn uniformly from
/// `[min_backoff_secs, max_backoff_secs]`, multiplied by `multiplier` for
/// every failed attempt after the first and capped at `max_delay`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: Option<u32>,
    min_backoff_secs: u64,
    max_backoff_secs: u64,
    multiplier: f64,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        min_backoff_secs: u64,
        max_backoff_secs: u64,
        multiplier: f64,
        max_delay: Duration,
    ) -> Self {
        Self {
            max_attempts: Some(max_attempts.max(1)),
            min_backoff_secs: min_backoff_secs.min(max_backoff_secs),
            max_backoff_secs,
            multiplier: if multiplier.is_finite() && multiplier >= 1.0 {
                multiplier
            } else {
                1.0
            },
            max_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.min_backoff_secs,
            config.max_backoff_secs,
            config.multiplier,
            Duration::from_secs(config.max_delay_secs),
        )
    }

    /// Retries forever with a flat 5-15 second delay
    pub fn unbounded() -> Self {
        Self {
            max_attempts: None,
            min_backoff_secs: 5,
            max_backoff_secs: 15,
            multiplier: 1.0,
            max_delay: Duration::from_secs(15),
        }
    }

    /// Retries without waiting, up to `max_attempts` loads per page
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, 0, 0, 1.0, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Whether load number `attempt` (1-based) may be made
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempt <= max)
    }

    /// Delay to wait after `failed_attempts` consecutive failures
    pub fn delay_for(&self, failed_attempts: u32) -> Duration {
        let base = rand::thread_rng().gen_range(self.min_backoff_secs..=self.max_backoff_secs);
        let exponent = i32::try_from(failed_attempts.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = base as f64 * self.multiplier.powi(exponent);

        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
