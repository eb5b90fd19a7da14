//! Asynchronous generation jobs.
//!
//! A [`GenerationJob`] is created when a vendor accepts a video job and is
//! only ever mutated by status checks. Its status moves forward through
//! `queued → running → {completed | failed | timed_out}` and never leaves a
//! terminal state.

use crate::error::GatewayError;
use crate::model::VideoModel;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted, not started
    Queued,
    /// In progress
    Running,
    /// Finished with a result
    Completed,
    /// Vendor reported failure
    Failed,
    /// Poll budget exhausted
    TimedOut,
}

impl JobStatus {
    /// Whether no further transition is possible
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::TimedOut)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::Running => 1,
            Self::Completed | Self::Failed | Self::TimedOut => 2,
        }
    }

    /// Lowercase name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vendor-side asynchronous job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    /// Vendor-assigned id
    pub request_id: String,
    /// Model the job was submitted to
    pub model: VideoModel,
    status: JobStatus,
    /// Result URL once completed
    pub result_url: Option<String>,
    /// Failure reason once failed
    pub error_detail: Option<String>,
}

impl GenerationJob {
    /// A freshly accepted job
    #[must_use]
    pub fn queued(request_id: impl Into<String>, model: VideoModel) -> Self {
        Self {
            request_id: request_id.into(),
            model,
            status: JobStatus::Queued,
            result_url: None,
            error_detail: None,
        }
    }

    /// Current status
    #[must_use]
    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Opaque model id
    #[must_use]
    pub fn vendor_model_id(&self) -> &'static str {
        self.model.model_id()
    }

    /// Move to `next`.
    ///
    /// Returns `Ok(true)` when the status changed and `Ok(false)` when the
    /// transition was a no-op or a regression (a vendor reporting `queued`
    /// after `running`), which is ignored. Leaving a terminal state is an
    /// error.
    pub fn transition(&mut self, next: JobStatus) -> Result<bool, GatewayError> {
        if self.status == next {
            return Ok(false);
        }
        if self.status.is_terminal() {
            return Err(GatewayError::internal(format!(
                "job {} cannot move from {} to {}",
                self.request_id, self.status, next
            )));
        }
        if next.rank() < self.status.rank() {
            debug!(
                request_id = %self.request_id,
                from = %self.status,
                to = %next,
                "Ignoring status regression"
            );
            return Ok(false);
        }
        self.status = next;
        Ok(true)
    }

    /// Mark completed with a result URL
    pub fn complete(&mut self, url: impl Into<String>) -> Result<(), GatewayError> {
        self.transition(JobStatus::Completed)?;
        self.result_url = Some(url.into());
        Ok(())
    }

    /// Mark failed with a reason
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), GatewayError> {
        self.transition(JobStatus::Failed)?;
        self.error_detail = Some(reason.into());
        Ok(())
    }

    /// Mark timed out
    pub fn time_out(&mut self) -> Result<(), GatewayError> {
        self.transition(JobStatus::TimedOut)?;
        self.error_detail = Some("status polling budget exhausted".to_string());
        Ok(())
    }
}

/// One vendor status check, normalised.
///
/// `url` is kept as raw JSON so the poller can reject a non-string URL
/// instead of coercing it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    /// Normalised status
    pub status: JobStatus,
    /// Result URL as returned by the vendor
    pub url: Option<Value>,
    /// Vendor failure reason
    pub error: Option<String>,
}

impl StatusReport {
    /// Job still waiting
    #[must_use]
    pub fn queued() -> Self {
        Self {
            status: JobStatus::Queued,
            url: None,
            error: None,
        }
    }

    /// Job in progress
    #[must_use]
    pub fn running() -> Self {
        Self {
            status: JobStatus::Running,
            url: None,
            error: None,
        }
    }

    /// Job done
    #[must_use]
    pub fn completed(url: Value) -> Self {
        Self {
            status: JobStatus::Completed,
            url: Some(url),
            error: None,
        }
    }

    /// Job failed
    #[must_use]
    pub fn failed(error: Option<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            url: None,
            error,
        }
    }

    /// The URL, if present and a string
    #[must_use]
    pub fn url_str(&self) -> Option<&str> {
        self.url.as_ref().and_then(Value::as_str)
    }
}
