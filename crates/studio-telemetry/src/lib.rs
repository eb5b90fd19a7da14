//! # Studio Telemetry
//!
//! Observability for the studio generation gateway:
//! - Structured logging through `tracing-subscriber`
//! - Optional OpenTelemetry tracing layer
//! - Prometheus metrics

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod metrics;
pub mod tracing_setup;

// Re-export main types
pub use metrics::{Metrics, Outcome};
pub use tracing_setup::{env_filter, init_telemetry, shutdown_telemetry, TelemetryError};
