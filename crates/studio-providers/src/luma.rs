//! Luma Dream Machine adapter.
//!
//! `POST /generations` creates a job, `GET /generations/{id}` reports its
//! `state` (`queued`, `dreaming`, `completed`, `failed`). The raw JSON
//! methods back the `/api/generate-video` passthrough endpoint; the
//! [`VideoGenerator`] impl normalises the same calls for the orchestrator.

use crate::http;
use crate::payload::VendorRequest;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use studio_config::{VendorConfig, DEFAULT_LUMA_BASE_URL};
use studio_core::{
    GatewayError, GatewayResult, GenerationJob, StatusReport, Vendor, VideoGenerator, VideoModel,
    VideoRequest,
};
use tracing::{debug, info};

/// Luma provider
pub struct LumaProvider {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

impl std::fmt::Debug for LumaProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LumaProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl LumaProvider {
    /// Create a provider
    ///
    /// # Errors
    /// Returns `MissingCredential` without an API key
    pub fn new(config: &VendorConfig) -> GatewayResult<Self> {
        let api_key = http::require_key(Vendor::Luma, config.api_key.as_ref())?;

        Ok(Self {
            client: http::build_client()?,
            api_key,
            base_url: config
                .base_url_or(DEFAULT_LUMA_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// Create a generation and return Luma's JSON as-is
    pub async fn create_generation(&self, model: VideoModel, request: &VideoRequest) -> GatewayResult<Value> {
        if model.vendor() != Vendor::Luma {
            return Err(GatewayError::internal(format!(
                "{} is not served by Luma",
                model.model_id()
            )));
        }

        debug!(vendor = "luma", model = model.model_id(), "Creating generation");

        let response = http::send(
            Vendor::Luma,
            self.client
                .post(format!("{}/generations", self.base_url))
                .bearer_auth(self.api_key.expose_secret())
                .json(&VendorRequest::video(model, request)),
        )
        .await?;
        http::read_json(Vendor::Luma, response).await
    }

    /// Fetch a generation and return Luma's JSON as-is
    pub async fn get_generation(&self, id: &str) -> GatewayResult<Value> {
        let id = http::path_segment("generation id", id)?;
        let response = http::send(
            Vendor::Luma,
            self.client
                .get(format!("{}/generations/{}", self.base_url, id))
                .bearer_auth(self.api_key.expose_secret()),
        )
        .await?;
        http::read_json(Vendor::Luma, response).await
    }

    /// Normalise a generation object
    fn report(generation: &Value) -> GatewayResult<StatusReport> {
        let state = generation
            .get("state")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::invalid_shape("luma", "generation has no state"))?;

        match state {
            "queued" => Ok(StatusReport::queued()),
            "dreaming" => Ok(StatusReport::running()),
            "completed" => Ok(StatusReport::completed(
                generation
                    .get("assets")
                    .and_then(|a| a.get("video"))
                    .cloned()
                    .unwrap_or(Value::Null),
            )),
            "failed" => Ok(StatusReport::failed(
                generation
                    .get("failure_reason")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            )),
            other => Err(GatewayError::invalid_shape(
                "luma",
                format!("unknown generation state {other}"),
            )),
        }
    }
}

#[async_trait]
impl VideoGenerator for LumaProvider {
    fn vendor(&self) -> Vendor {
        Vendor::Luma
    }

    async fn submit(&self, model: VideoModel, request: &VideoRequest) -> GatewayResult<GenerationJob> {
        let generation = self.create_generation(model, request).await?;
        let id = generation
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GatewayError::invalid_shape("luma", "generation has no id"))?;

        info!(vendor = "luma", model = model.model_id(), request_id = id, "Video job queued");
        Ok(GenerationJob::queued(id, model))
    }

    async fn check_status(&self, job: &GenerationJob) -> GatewayResult<StatusReport> {
        let generation = self.get_generation(&job.request_id).await?;
        Self::report(&generation)
    }
}
