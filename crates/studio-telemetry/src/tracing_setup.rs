//! Logging and distributed tracing setup.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter`
//! (`RUST_LOG` wins over the configured level), plain or JSON log lines,
//! and an OpenTelemetry layer when tracing is enabled.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::{
    trace::{Config, RandomIdGenerator, Sampler, TracerProvider},
    Resource,
};
use studio_config::TelemetryConfig;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Telemetry initialization error
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

/// Filter from `RUST_LOG`, or the configured level when unset or invalid
#[must_use]
pub fn env_filter(config: &TelemetryConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

fn tracer_provider(config: &TelemetryConfig) -> TracerProvider {
    let resource = Resource::new(vec![
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        KeyValue::new("deployment.environment", config.environment.clone()),
    ]);

    TracerProvider::builder()
        .with_config(
            Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(resource),
        )
        .build()
}

/// Install the global subscriber
///
/// Returns the tracer provider when the OpenTelemetry layer is enabled so
/// the caller can flush it on shutdown.
///
/// # Errors
/// Returns an error if a global subscriber is already set
pub fn init_telemetry(config: &TelemetryConfig) -> Result<Option<TracerProvider>, TelemetryError> {
    let provider = config.tracing_enabled.then(|| tracer_provider(config));
    let otel_layer = provider.as_ref().map(|p| {
        tracing_opentelemetry::layer().with_tracer(p.tracer(config.service_name.clone()))
    });

    let fmt_layer = if config.json_logs {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(otel_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))?;

    info!(
        service = %config.service_name,
        environment = %config.environment,
        json = config.json_logs,
        tracing = config.tracing_enabled,
        "Telemetry initialized"
    );

    Ok(provider)
}

/// Flush and drop the tracer provider
pub fn shutdown_telemetry(provider: Option<TracerProvider>) {
    if let Some(provider) = provider {
        drop(provider);
        info!("Tracing shutdown complete");
    }
}
