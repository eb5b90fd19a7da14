//! Asynchronous job poller.
//!
//! Drives a [`GenerationJob`] to a terminal state by querying its vendor at
//! a fixed interval. Each iteration checks status first and sleeps after,
//! so `n` checks take `(n - 1) * interval`. Transient status errors and
//! vendor rate limits count as an iteration and are retried on the next
//! one; anything else aborts.

use async_trait::async_trait;
use std::time::Duration;
use studio_config::PollingSettings;
use studio_core::{GatewayError, GatewayResult, GenerationJob, JobStatus, VideoGenerator};
use tracing::{debug, info, warn};

/// Source of delays between status checks
#[async_trait]
pub trait PollTimer: Send + Sync {
    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Real timer backed by `tokio::time`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl PollTimer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Successful poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// Result URL
    pub url: String,
    /// Status checks performed
    pub iterations: u32,
}

/// Polls a video job until it completes, fails or runs out of iterations
#[derive(Debug, Clone)]
pub struct JobPoller<T: PollTimer = TokioTimer> {
    interval: Duration,
    max_iterations: u32,
    timer: T,
}

impl JobPoller<TokioTimer> {
    /// Poller with the real timer
    #[must_use]
    pub fn new(settings: &PollingSettings) -> Self {
        Self::with_timer(settings.interval, settings.max_iterations, TokioTimer)
    }
}

impl Default for JobPoller<TokioTimer> {
    fn default() -> Self {
        Self::new(&PollingSettings::default())
    }
}

impl<T: PollTimer> JobPoller<T> {
    /// Poller with a custom timer
    #[must_use]
    pub fn with_timer(interval: Duration, max_iterations: u32, timer: T) -> Self {
        Self {
            interval,
            max_iterations: max_iterations.max(1),
            timer,
        }
    }

    /// Interval between checks
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Iteration budget
    #[must_use]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Poll `job` on `generator` until it reaches a terminal state.
    ///
    /// # Errors
    /// - `GenerationFailed` when the vendor reports failure
    /// - `GenerationTimeout` when the iteration budget runs out
    /// - `InvalidUpstreamShape` when a completed job has no string URL
    /// - any error from the status call other than a transient failure or a
    ///   rate limit
    pub async fn poll(
        &self,
        generator: &dyn VideoGenerator,
        job: &mut GenerationJob,
    ) -> GatewayResult<PollOutcome> {
        let vendor = generator.vendor();

        for iteration in 1..=self.max_iterations {
            let mut delay = self.interval;
            match generator.check_status(job).await {
                Ok(report) => match report.status {
                    JobStatus::Completed => {
                        let url = report
                            .url_str()
                            .filter(|u| !u.is_empty())
                            .map(str::to_string)
                            .ok_or_else(|| {
                                GatewayError::invalid_shape(
                                    vendor.as_str(),
                                    "completed job has no video URL string",
                                )
                            })?;
                        job.complete(url.clone())?;
                        info!(
                            vendor = %vendor,
                            request_id = %job.request_id,
                            iterations = iteration,
                            "Generation completed"
                        );
                        return Ok(PollOutcome {
                            url,
                            iterations: iteration,
                        });
                    }
                    JobStatus::Failed => {
                        let message = report
                            .error
                            .filter(|e| !e.trim().is_empty())
                            .unwrap_or_else(|| "Generation failed".to_string());
                        job.fail(message.clone())?;
                        warn!(
                            vendor = %vendor,
                            request_id = %job.request_id,
                            error = %message,
                            "Generation failed"
                        );
                        return Err(GatewayError::GenerationFailed {
                            request_id: job.request_id.clone(),
                            message,
                        });
                    }
                    JobStatus::Queued | JobStatus::Running => {
                        job.transition(report.status)?;
                        debug!(
                            vendor = %vendor,
                            request_id = %job.request_id,
                            status = %job.status(),
                            iteration = iteration,
                            "Generation in progress"
                        );
                    }
                    JobStatus::TimedOut => {
                        return Err(GatewayError::invalid_shape(
                            vendor.as_str(),
                            "vendor reported an unknown terminal state",
                        ));
                    }
                },
                Err(e) if e.is_transient() => {
                    warn!(
                        vendor = %vendor,
                        request_id = %job.request_id,
                        iteration = iteration,
                        error = %e,
                        "Status check failed, will retry"
                    );
                }
                Err(GatewayError::RateLimited { retry_after, .. }) => {
                    if let Some(wait) = retry_after {
                        delay = delay.max(wait);
                    }
                    warn!(
                        vendor = %vendor,
                        request_id = %job.request_id,
                        iteration = iteration,
                        ?retry_after,
                        "Status check rate limited, will retry"
                    );
                }
                Err(e) => return Err(e),
            }

            if iteration < self.max_iterations {
                self.timer.sleep(delay).await;
            }
        }

        job.time_out()?;
        warn!(
            vendor = %vendor,
            request_id = %job.request_id,
            attempts = self.max_iterations,
            "Generation timed out"
        );
        Err(GatewayError::GenerationTimeout {
            request_id: job.request_id.clone(),
            attempts: self.max_iterations,
        })
    }
}
