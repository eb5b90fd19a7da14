//! Shared application state.

use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use studio_config::StudioConfig;
use studio_core::{GatewayError, GatewayResult};
use studio_media::{MediaProcessRunner, Muxer};
use studio_providers::ProviderRegistry;
use studio_resilience::{JobPoller, RetryPolicy};
use studio_routing::ProviderRouter;
use studio_telemetry::{Metrics, Outcome};

/// State handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Validated configuration
    pub config: Arc<StudioConfig>,
    /// Vendor adapters
    pub providers: ProviderRegistry,
    /// Model selection
    pub router: ProviderRouter,
    /// Image generation retry policy
    pub image_retry: RetryPolicy,
    /// Video job poller
    pub poller: Arc<JobPoller>,
    /// Media post-processor
    pub muxer: Muxer,
    /// Prometheus collectors
    pub metrics: Metrics,
    /// Client for the same-origin fetch proxy
    pub proxy_client: Client,
    /// Process start
    pub started_at: Instant,
}

impl AppState {
    /// Start building state
    #[must_use]
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }

    /// State with adapters for every configured vendor
    pub fn from_config(config: StudioConfig) -> GatewayResult<Self> {
        let providers = ProviderRegistry::from_config(&config.providers)?;
        Self::builder().config(config).providers(providers).build()
    }

    /// Count a finished generation and any vendor error behind it
    pub fn record<T>(&self, kind: &str, model: &str, result: &GatewayResult<T>) {
        match result {
            Ok(_) => self.metrics.record_generation(kind, model, Outcome::Success),
            Err(err) => {
                self.metrics.record_generation(kind, model, Outcome::Error);
                match err {
                    GatewayError::Upstream { vendor, status, .. } => {
                        self.metrics.record_upstream_error(vendor, *status);
                    }
                    GatewayError::RateLimited { vendor, .. } => {
                        self.metrics.record_upstream_error(vendor, 429);
                    }
                    GatewayError::Network { vendor, .. } => {
                        self.metrics.record_upstream_error(vendor, 0);
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Builder for [`AppState`]
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<StudioConfig>,
    providers: Option<ProviderRegistry>,
    router: Option<ProviderRouter>,
    media_runner: Option<Arc<dyn MediaProcessRunner>>,
}

impl AppStateBuilder {
    /// Set the configuration
    #[must_use]
    pub fn config(mut self, config: StudioConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the provider registry
    #[must_use]
    pub fn providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Set the router
    #[must_use]
    pub fn router(mut self, router: ProviderRouter) -> Self {
        self.router = Some(router);
        self
    }

    /// Replace the ffmpeg process runner
    #[must_use]
    pub fn media_runner(mut self, runner: Arc<dyn MediaProcessRunner>) -> Self {
        self.media_runner = Some(runner);
        self
    }

    /// Build the state
    pub fn build(self) -> GatewayResult<AppState> {
        let config = self.config.unwrap_or_default();

        let muxer = match self.media_runner {
            Some(runner) => Muxer::with_runner(&config.media, runner)?,
            None => Muxer::new(&config.media)?,
        };
        let metrics = Metrics::new()
            .map_err(|e| GatewayError::internal(format!("Failed to register metrics: {e}")))?;
        let proxy_client = Client::builder()
            .build()
            .map_err(|e| GatewayError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(AppState {
            image_retry: RetryPolicy::from_settings(&config.generation.image_retry),
            poller: Arc::new(JobPoller::new(&config.generation.polling)),
            providers: self.providers.unwrap_or_default(),
            router: self.router.unwrap_or_default(),
            muxer,
            metrics,
            proxy_client,
            started_at: Instant::now(),
            config: Arc::new(config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let state = AppState::builder().build().unwrap();
        assert!(state.providers.configured_vendors().is_empty());
        assert_eq!(state.poller.max_iterations(), 60);
        assert_eq!(state.image_retry.config().max_attempts, 3);
    }

    #[test]
    fn test_record_counts_upstream_errors() {
        let state = AppState::builder().build().unwrap();
        let result: GatewayResult<()> = Err(GatewayError::upstream("fal", 503, "down"));
        state.record("image", "fal-ai/flux-pro/v1.1-ultra", &result);

        let text = state.metrics.gather();
        assert!(text.contains("outcome=\"error\""));
        assert!(text.contains("status=\"503\""));
    }
}
