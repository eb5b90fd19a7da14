//! Retry policy with linear or exponential backoff.
//!
//! Image generation retries transient vendor failures with a linear
//! schedule (`base * n` before attempt `n + 1`); the SDK reuses the same
//! type with an exponential schedule for rate limits.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use studio_config::RetrySettings;
use studio_core::GatewayError;
use tracing::{debug, warn};

/// Delay growth between attempts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// `base * n` after the `n`th failed attempt
    Linear,
    /// `base * multiplier^(n-1)` after the `n`th failed attempt
    Exponential {
        /// Growth factor
        multiplier: f64,
    },
}

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, the first call included
    pub max_attempts: u32,
    /// Delay unit
    pub base_delay: Duration,
    /// Upper bound on a single delay
    pub max_delay: Duration,
    /// Growth schedule
    pub backoff: Backoff,
    /// Jitter factor (0.0 - 1.0)
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(60),
            backoff: Backoff::Linear,
            jitter: 0.0,
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            base_delay: settings.base_delay,
            ..Self::default()
        }
    }
}

/// Retry policy implementation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Create a new retry policy with the given configuration
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Linear policy from configuration
    #[must_use]
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(RetryConfig::from(settings))
    }

    /// Exponential policy: `base`, `2*base`, `4*base`, ...
    #[must_use]
    pub fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self::new(RetryConfig {
            max_attempts,
            base_delay,
            backoff: Backoff::Exponential { multiplier: 2.0 },
            ..RetryConfig::default()
        })
    }

    /// Delay after the `failed_attempts`th failure (1-indexed)
    #[must_use]
    pub fn delay_after(&self, failed_attempts: u32) -> Duration {
        let n = failed_attempts.max(1);
        let base = self.config.base_delay.as_millis() as f64;
        let delay = match self.config.backoff {
            Backoff::Linear => base * f64::from(n),
            Backoff::Exponential { multiplier } => base * multiplier.powi((n - 1) as i32),
        };
        let delay = delay.min(self.config.max_delay.as_millis() as f64);

        let final_delay = if self.config.jitter > 0.0 {
            let range = delay * self.config.jitter;
            (delay + rand::thread_rng().gen_range(-range..=range)).max(0.0)
        } else {
            delay
        };

        Duration::from_millis(final_delay as u64)
    }

    /// Transient vendor failures: 5xx and network errors
    #[must_use]
    pub fn is_retryable(&self, error: &GatewayError) -> bool {
        error.is_transient()
    }

    /// Execute an operation, retrying transient gateway errors
    ///
    /// # Errors
    /// Returns the first non-retryable error, or the last error once all
    /// attempts are used
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, GatewayError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        self.execute_if(operation, |e| self.is_retryable(e)).await
    }

    /// Execute an operation, retrying errors that satisfy `retryable`
    ///
    /// # Errors
    /// Returns the first non-retryable error, or the last error once all
    /// attempts are used
    pub async fn execute_if<F, Fut, T, E, R>(&self, operation: F, retryable: R) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
        R: Fn(&E) -> bool,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(attempt = attempt, "Retry succeeded");
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if attempt >= max_attempts || !retryable(&error) {
                        return Err(error);
                    }

                    let delay = self.delay_after(attempt);
                    warn!(
                        attempt = attempt,
                        max_attempts = max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Retrying after error"
                    );

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}
