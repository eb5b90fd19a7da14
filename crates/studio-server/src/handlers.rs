//! HTTP request handlers for the proxy endpoints.
//!
//! Each handler validates its required fields, resolves the vendor adapter
//! through the registry and forwards the call. Vendor keys never leave the
//! server.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use studio_core::api::{
    require, GenerateAudioBody, GenerateImageBody, GenerateVideoBody, MuxVideoBody, TextBody,
    TextResponse, UrlResponse, VideoAction,
};
use studio_core::{
    GatewayError, GatewayResult, GenerationRequest, ImageModel, ImageRequest, MediaKind,
    SpeechRequest, TextRequest, VideoModel, VideoRequest,
};
use studio_media::MuxRequest;
use tracing::{debug, info, instrument};

use crate::{error::ApiError, extractors::JsonBody, state::AppState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
}

/// Readiness response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// `ready` or `unavailable`
    pub status: String,
    /// Vendors with a configured key
    pub vendors: Vec<String>,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

/// Readiness check endpoint: ready once at least one vendor is configured
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let vendors: Vec<String> = state
        .providers
        .configured_vendors()
        .into_iter()
        .map(|v| v.as_str().to_string())
        .collect();

    if vendors.is_empty() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "unavailable".to_string(),
                vendors,
            }),
        )
    } else {
        (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready".to_string(),
                vendors,
            }),
        )
    }
}

/// Liveness check endpoint
pub async fn liveness_check() -> impl IntoResponse {
    (StatusCode::OK, "alive")
}

/// Metrics endpoint (Prometheus format)
pub async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.gather(),
    )
}

/// Generate an image with linear-backoff retries on transient failures
pub(crate) async fn generate_image_url(
    state: &AppState,
    request: &ImageRequest,
) -> GatewayResult<String> {
    let model = ImageModel::FluxProUltra.model_id();
    let result: GatewayResult<String> = async {
        let generator = state.providers.image()?;
        state
            .image_retry
            .execute(|| generator.generate_image(request))
            .await
    }
    .await;

    state.record(MediaKind::Image.as_str(), model, &result);
    result
}

/// Route and synthesize speech, answering with `audio/mpeg` bytes
pub(crate) async fn synthesize_speech(
    state: &AppState,
    text: &str,
    voice: &str,
    speed: Option<f32>,
    provider: Option<String>,
) -> GatewayResult<Response> {
    let decision = state
        .router
        .route(&GenerationRequest::new(MediaKind::Audio, text).with_voice(provider, voice))?;
    let model = decision
        .speech_model()
        .ok_or_else(|| GatewayError::internal("audio route without a speech model"))?;

    let result: GatewayResult<bytes::Bytes> = async {
        let synthesizer = state.providers.speech(model)?;
        synthesizer
            .synthesize(
                model,
                &SpeechRequest {
                    text: text.to_string(),
                    voice: voice.to_string(),
                    speed,
                },
            )
            .await
    }
    .await;
    state.record(MediaKind::Audio.as_str(), model.model_id(), &result);

    let audio = result?;
    debug!(model = model.model_id(), bytes = audio.len(), "Synthesized speech");
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response())
}

/// `POST /api/generate-image`
#[instrument(skip_all, fields(endpoint = "generate-image"))]
pub async fn generate_image(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<GenerateImageBody>,
) -> Result<Json<UrlResponse>, ApiError> {
    let prompt = require(body.prompt.as_ref(), "prompt")?;
    let request = ImageRequest {
        prompt: prompt.to_string(),
        aspect_ratio: body.aspect_ratio,
        reference_images: body.reference_images,
    };

    let url = generate_image_url(&state, &request).await?;
    info!(model = ImageModel::FluxProUltra.model_id(), "Image generated");
    Ok(Json(UrlResponse { url }))
}

/// `POST /api/generate-audio`
#[instrument(skip_all, fields(endpoint = "generate-audio"))]
pub async fn generate_audio(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<GenerateAudioBody>,
) -> Result<Response, ApiError> {
    let text = require(body.text.as_ref(), "text")?;
    let voice = require(body.voice.as_ref(), "voice")?;

    Ok(synthesize_speech(&state, text, voice, body.speed, body.provider.clone()).await?)
}

/// `POST /api/generate-video`: Luma Dream Machine passthrough
#[instrument(skip_all, fields(endpoint = "generate-video"))]
pub async fn generate_video(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<GenerateVideoBody>,
) -> Result<Json<Value>, ApiError> {
    match body.action {
        VideoAction::Create => {
            let prompt = require(body.prompt.as_ref(), "prompt")?;
            let image_url = non_blank(body.image_url.as_deref());
            let model = if image_url.is_some() {
                VideoModel::LumaRay2Image
            } else {
                VideoModel::LumaRay2Text
            };
            let request = VideoRequest {
                prompt: prompt.to_string(),
                image_url,
                image_end_url: non_blank(body.image_end_url.as_deref()),
                audio_url: None,
                duration: body.duration,
                aspect_ratio: body.aspect_ratio,
            };

            let result: GatewayResult<Value> =
                async { state.providers.luma()?.create_generation(model, &request).await }.await;
            state.record(MediaKind::Video.as_str(), model.model_id(), &result);
            Ok(Json(result?))
        }
        VideoAction::Status => {
            let id = require(body.generation_id.as_ref(), "generationId")?;
            let generation = state.providers.luma()?.get_generation(id).await?;
            Ok(Json(generation))
        }
    }
}

fn non_blank(url: Option<&str>) -> Option<String> {
    url.map(str::trim).filter(|u| !u.is_empty()).map(str::to_string)
}

/// `POST /api/mux-video`
#[instrument(skip_all, fields(endpoint = "mux-video"))]
pub async fn mux_video(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<MuxVideoBody>,
) -> Result<Json<UrlResponse>, ApiError> {
    let video_url = require(body.video_url.as_ref(), "videoUrl")?;
    let request = MuxRequest {
        video_url: video_url.to_string(),
        dialogue_url: body.audio_url,
        music_url: body.bgm_url,
    };

    let url = state.muxer.mux(&request).await?;
    Ok(Json(UrlResponse { url }))
}

/// `POST /api/gemini`
#[instrument(skip_all, fields(endpoint = "gemini"))]
pub async fn gemini(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<TextBody>,
) -> Result<Json<TextResponse>, ApiError> {
    let prompt = require(body.prompt.as_ref(), "prompt")?;

    let result: GatewayResult<String> = async {
        state
            .providers
            .text()?
            .generate_text(&TextRequest {
                prompt: prompt.to_string(),
            })
            .await
    }
    .await;
    state.record("text", &state.config.providers.gemini.model, &result);

    Ok(Json(TextResponse { result: result? }))
}
