//! fal.ai adapter: Flux image generation and queued video models (Kling,
//! Kling AI avatar, MiniMax Hailuo).
//!
//! # API Formats
//! - Sync: `POST https://fal.run/{model}` answers with the result
//! - Queue: `POST https://queue.fal.run/{model}` answers with a `request_id`;
//!   status is `GET /{app}/requests/{id}/status` and the result is
//!   `GET /{app}/requests/{id}`, where `{app}` is the first two segments of
//!   the model id

use crate::http;
use crate::payload::VendorRequest;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use studio_config::FalConfig;
use studio_core::{
    GatewayError, GatewayResult, GenerationJob, ImageGenerator, ImageModel, ImageRequest,
    StatusReport, Vendor, VideoGenerator, VideoModel, VideoRequest,
};
use tracing::{debug, info};

/// fal.ai provider
pub struct FalProvider {
    client: Client,
    api_key: SecretString,
    sync_base_url: String,
    queue_base_url: String,
}

impl std::fmt::Debug for FalProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FalProvider")
            .field("sync_base_url", &self.sync_base_url)
            .field("queue_base_url", &self.queue_base_url)
            .finish_non_exhaustive()
    }
}

impl FalProvider {
    /// Create a provider
    ///
    /// # Errors
    /// Returns `MissingCredential` without an API key
    pub fn new(config: &FalConfig) -> GatewayResult<Self> {
        let api_key = http::require_key(Vendor::Fal, config.api_key.as_ref())?;

        Ok(Self {
            client: http::build_client()?,
            api_key,
            sync_base_url: config.sync_base_url.trim_end_matches('/').to_string(),
            queue_base_url: config.queue_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn auth(&self) -> String {
        format!("Key {}", self.api_key.expose_secret())
    }

    /// `{app}` part of queue URLs: the first two path segments of the model id
    fn app_id(model_id: &str) -> &str {
        match model_id.match_indices('/').nth(1) {
            Some((idx, _)) => &model_id[..idx],
            None => model_id,
        }
    }

    fn request_url(&self, model: VideoModel, request_id: &str) -> GatewayResult<String> {
        Ok(format!(
            "{}/{}/requests/{}",
            self.queue_base_url,
            Self::app_id(model.model_id()),
            http::path_segment("request id", request_id)?
        ))
    }

    async fn fetch_result(&self, job: &GenerationJob) -> GatewayResult<Value> {
        let response = http::send(
            Vendor::Fal,
            self.client
                .get(self.request_url(job.model, &job.request_id)?)
                .header("Authorization", self.auth()),
        )
        .await?;
        http::read_json(Vendor::Fal, response).await
    }
}

#[async_trait]
impl ImageGenerator for FalProvider {
    fn vendor(&self) -> Vendor {
        Vendor::Fal
    }

    async fn generate_image(&self, request: &ImageRequest) -> GatewayResult<String> {
        let model = ImageModel::FluxProUltra.model_id();
        let url = format!("{}/{}", self.sync_base_url, model);

        debug!(vendor = "fal", model = model, "Sending image generation request");

        let response = http::send(
            Vendor::Fal,
            self.client
                .post(&url)
                .header("Authorization", self.auth())
                .json(&VendorRequest::image(request)),
        )
        .await?;

        let body: FluxResponse = http::read_json(Vendor::Fal, response).await?;
        body.images
            .into_iter()
            .find_map(|image| image.url.filter(|u| !u.is_empty()))
            .ok_or_else(|| GatewayError::invalid_shape("fal", "response contained no image URL"))
    }
}

#[async_trait]
impl VideoGenerator for FalProvider {
    fn vendor(&self) -> Vendor {
        Vendor::Fal
    }

    async fn submit(&self, model: VideoModel, request: &VideoRequest) -> GatewayResult<GenerationJob> {
        if model.vendor() != Vendor::Fal {
            return Err(GatewayError::internal(format!(
                "{} is not served by fal.ai",
                model.model_id()
            )));
        }
        if model.is_lip_sync() && (request.image_url.is_none() || request.audio_url.is_none()) {
            return Err(GatewayError::invalid_request(
                "Lip-sync requires both an image and an audio track",
            ));
        }

        let url = format!("{}/{}", self.queue_base_url, model.model_id());
        debug!(vendor = "fal", model = model.model_id(), "Submitting video job");

        let response = http::send(
            Vendor::Fal,
            self.client
                .post(&url)
                .header("Authorization", self.auth())
                .json(&VendorRequest::video(model, request)),
        )
        .await?;

        let accepted: QueueSubmitResponse = http::read_json(Vendor::Fal, response).await?;
        info!(
            vendor = "fal",
            model = model.model_id(),
            request_id = %accepted.request_id,
            "Video job queued"
        );
        Ok(GenerationJob::queued(accepted.request_id, model))
    }

    async fn check_status(&self, job: &GenerationJob) -> GatewayResult<StatusReport> {
        let url = format!("{}/status", self.request_url(job.model, &job.request_id)?);
        let response = http::send(
            Vendor::Fal,
            self.client.get(&url).header("Authorization", self.auth()),
        )
        .await?;
        let status: QueueStatusResponse = http::read_json(Vendor::Fal, response).await?;

        debug!(
            vendor = "fal",
            request_id = %job.request_id,
            status = %status.status,
            "Queue status"
        );

        match status.status.as_str() {
            "IN_QUEUE" => Ok(StatusReport::queued()),
            "IN_PROGRESS" => Ok(StatusReport::running()),
            "COMPLETED" => {
                let result = self.fetch_result(job).await?;
                let url = result
                    .get("video")
                    .and_then(|v| v.get("url"))
                    .cloned()
                    .unwrap_or(Value::Null);
                Ok(StatusReport::completed(url))
            }
            "FAILED" | "ERROR" => Ok(StatusReport::failed(status.error)),
            other => Err(GatewayError::invalid_shape(
                "fal",
                format!("unknown queue status {other}"),
            )),
        }
    }
}

// fal.ai API types

#[derive(Debug, Deserialize)]
struct FluxResponse {
    #[serde(default)]
    images: Vec<FluxImage>,
}

#[derive(Debug, Deserialize)]
struct FluxImage {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueueSubmitResponse {
    request_id: String,
}

#[derive(Debug, Deserialize)]
struct QueueStatusResponse {
    status: String,
    #[serde(default)]
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use studio_core::JobStatus;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> FalProvider {
        FalProvider::new(&FalConfig {
            api_key: Some(SecretString::new("fal-test".to_string())),
            sync_base_url: server.uri(),
            queue_base_url: server.uri(),
        })
        .unwrap()
    }

    fn video_request() -> VideoRequest {
        VideoRequest {
            prompt: "rooftop chase".to_string(),
            ..VideoRequest::default()
        }
    }

    #[test]
    fn test_app_id() {
        assert_eq!(
            FalProvider::app_id("fal-ai/kling-video/v2.1/master/text-to-video"),
            "fal-ai/kling-video"
        );
        assert_eq!(
            FalProvider::app_id("fal-ai/minimax/hailuo-02/standard/image-to-video"),
            "fal-ai/minimax"
        );
        assert_eq!(FalProvider::app_id("fal-ai/flux"), "fal-ai/flux");
    }

    #[test]
    fn test_missing_key() {
        let err = FalProvider::new(&FalConfig::default()).unwrap_err();
        assert!(matches!(err, GatewayError::MissingCredential { .. }));
    }

    #[tokio::test]
    async fn test_generate_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/fal-ai/flux-pro/v1.1-ultra"))
            .and(header("Authorization", "Key fal-test"))
            .and(body_partial_json(json!({"prompt": "castle", "num_images": 1})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "images": [{"url": "https://fal.media/castle.jpg", "width": 2048}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = provider(&server)
            .generate_image(&ImageRequest::new("castle"))
            .await
            .unwrap();
        assert_eq!(url, "https://fal.media/castle.jpg");
    }

    #[tokio::test]
    async fn test_generate_image_without_url_is_shape_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"images": []})))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate_image(&ImageRequest::new("castle"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidUpstreamShape { .. }));
    }

    #[tokio::test]
    async fn test_generate_image_maps_vendor_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"detail": [{"msg": "prompt rejected"}]})),
            )
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate_image(&ImageRequest::new("castle"))
            .await
            .unwrap_err();
        match err {
            GatewayError::Upstream { status, message, .. } => {
                assert_eq!(status, 422);
                assert_eq!(message, "prompt rejected");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate_image(&ImageRequest::new("castle"))
            .await
            .unwrap_err();
        match err {
            GatewayError::RateLimited { retry_after, .. } => {
                assert_eq!(retry_after, Some(std::time::Duration::from_secs(7)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_and_complete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/fal-ai/kling-video/v2.1/master/text-to-video"))
            .and(body_partial_json(json!({"prompt": "rooftop chase", "duration": "5"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "request_id": "req-123",
                "status_url": "https://queue.fal.run/fal-ai/kling-video/requests/req-123/status"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fal-ai/kling-video/requests/req-123/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "COMPLETED"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fal-ai/kling-video/requests/req-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "video": {"url": "https://fal.media/chase.mp4"}
            })))
            .mount(&server)
            .await;

        let fal = provider(&server);
        let job = fal.submit(VideoModel::KlingText, &video_request()).await.unwrap();
        assert_eq!(job.request_id, "req-123");
        assert_eq!(job.status(), JobStatus::Queued);

        let report = fal.check_status(&job).await.unwrap();
        assert_eq!(report.status, JobStatus::Completed);
        assert_eq!(report.url_str(), Some("https://fal.media/chase.mp4"));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fal-ai/minimax/requests/q1/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "IN_QUEUE"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fal-ai/minimax/requests/p1/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "IN_PROGRESS"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fal-ai/minimax/requests/f1/status"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "FAILED", "error": "nsfw"})),
            )
            .mount(&server)
            .await;

        let fal = provider(&server);
        let job = |id: &str| GenerationJob::queued(id, VideoModel::MinimaxText);

        assert_eq!(fal.check_status(&job("q1")).await.unwrap().status, JobStatus::Queued);
        assert_eq!(fal.check_status(&job("p1")).await.unwrap().status, JobStatus::Running);
        let failed = fal.check_status(&job("f1")).await.unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("nsfw"));
    }

    #[tokio::test]
    async fn test_lip_sync_requires_both_inputs() {
        let server = MockServer::start().await;
        let mut request = video_request();
        request.image_url = Some("https://img/face.png".into());

        let err = provider(&server)
            .submit(VideoModel::KlingAvatar, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn test_traversal_request_id_never_reaches_vendor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "COMPLETED"})))
            .expect(0)
            .mount(&server)
            .await;

        let job = GenerationJob::queued("../../billing", VideoModel::KlingText);
        let err = provider(&server).check_status(&job).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest { .. }));
    }
}
