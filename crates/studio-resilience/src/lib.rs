//! # Studio Resilience
//!
//! Resilience patterns for the studio generation gateway:
//! - Retry policy with linear or exponential backoff
//! - Asynchronous job poller with a bounded iteration budget

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod poller;
pub mod retry;

// Re-export main types
pub use poller::{JobPoller, PollOutcome, PollTimer, TokioTimer};
pub use retry::{Backoff, RetryConfig, RetryPolicy};
