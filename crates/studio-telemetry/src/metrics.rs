//! Prometheus metrics for the generation gateway.

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Result label for a finished generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Returned a result
    Success,
    /// Returned an error
    Error,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Gateway metrics, registered on a private registry
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    generation_requests: IntCounterVec,
    upstream_errors: IntCounterVec,
    poll_iterations: Histogram,
    request_duration: HistogramVec,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

impl Metrics {
    /// Create and register all collectors
    ///
    /// # Errors
    /// Returns an error if a collector cannot be registered
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let generation_requests = IntCounterVec::new(
            Opts::new(
                "studio_generation_requests_total",
                "Generation requests by kind, model and outcome",
            ),
            &["kind", "model", "outcome"],
        )?;
        let upstream_errors = IntCounterVec::new(
            Opts::new("studio_upstream_errors_total", "Vendor errors by vendor and status"),
            &["vendor", "status"],
        )?;
        let poll_iterations = Histogram::with_opts(
            HistogramOpts::new("studio_poll_iterations", "Status checks per polled video job")
                .buckets(vec![1.0, 3.0, 6.0, 12.0, 24.0, 36.0, 48.0, 60.0]),
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new("studio_request_duration_seconds", "Endpoint latency")
                .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0, 600.0]),
            &["endpoint"],
        )?;

        registry.register(Box::new(generation_requests.clone()))?;
        registry.register(Box::new(upstream_errors.clone()))?;
        registry.register(Box::new(poll_iterations.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            generation_requests,
            upstream_errors,
            poll_iterations,
            request_duration,
        })
    }

    /// Count a finished generation request
    pub fn record_generation(&self, kind: &str, model: &str, outcome: Outcome) {
        self.generation_requests
            .with_label_values(&[kind, model, outcome.as_str()])
            .inc();
    }

    /// Count a vendor error; `status` is `0` for transport failures
    pub fn record_upstream_error(&self, vendor: &str, status: u16) {
        let status = status.to_string();
        self.upstream_errors
            .with_label_values(&[vendor, status.as_str()])
            .inc();
    }

    /// Record how many status checks a poll took
    pub fn observe_poll_iterations(&self, iterations: u32) {
        self.poll_iterations.observe(f64::from(iterations));
    }

    /// Record endpoint latency
    pub fn observe_request_duration(&self, endpoint: &str, elapsed: Duration) {
        self.request_duration
            .with_label_values(&[endpoint])
            .observe(elapsed.as_secs_f64());
    }

    /// Prometheus text exposition of every collector
    #[must_use]
    pub fn gather(&self) -> String {
        let mut buffer = Vec::new();
        if TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .is_err()
        {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_includes_recorded_series() {
        let metrics = Metrics::new().unwrap();
        metrics.record_generation("video", "fal-ai/kling-video/v2.1/master/text-to-video", Outcome::Success);
        metrics.record_upstream_error("fal", 503);
        metrics.observe_poll_iterations(3);
        metrics.observe_request_duration("orchestrator", Duration::from_millis(250));

        let text = metrics.gather();
        assert!(text.contains("studio_generation_requests_total{"));
        assert!(text.contains("kind=\"video\""));
        assert!(text.contains("outcome=\"success\""));
        assert!(text.contains("status=\"503\""));
        assert!(text.contains("vendor=\"fal\""));
        assert!(text.contains("studio_poll_iterations_count 1"));
        assert!(text.contains("studio_request_duration_seconds_count{endpoint=\"orchestrator\"} 1"));
    }

    #[test]
    fn test_instances_are_independent() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.record_upstream_error("luma", 500);
        assert!(!b.gather().contains("vendor=\"luma\""));
    }
}
