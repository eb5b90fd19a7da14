//! `POST /api/orchestrator`: one endpoint for every generation kind.
//!
//! `type` selects the branch. Video requests go through the provider router
//! and, unless `wait` is `false`, are polled to completion before answering.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use studio_core::api::{require, ImageResult, JobResponse, OrchestratorBody};
use studio_core::{
    Asset, GatewayError, GatewayResult, GenerationJob, GenerationRequest, ImageRequest, JobStatus,
    MediaKind, ModelPreference, VideoModel,
};
use tracing::{info, instrument};

use crate::{
    error::ApiError,
    extractors::{JsonBody, RequestId},
    handlers::{generate_image_url, synthesize_speech},
    state::AppState,
};

/// `POST /api/orchestrator`
#[instrument(skip_all, fields(endpoint = "orchestrator", request_id = %request_id))]
pub async fn orchestrate(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    JsonBody(body): JsonBody<OrchestratorBody>,
) -> Result<Response, ApiError> {
    let kind = require(body.kind.as_ref(), "type")?;

    if kind.eq_ignore_ascii_case("status") {
        return Ok(Json(job_status(&state, &body).await?).into_response());
    }

    match kind.parse::<MediaKind>()? {
        MediaKind::Image => Ok(Json(image(&state, body).await?).into_response()),
        MediaKind::Video => Ok(Json(video(&state, body).await?).into_response()),
        MediaKind::Audio => {
            let text = body
                .text
                .as_ref()
                .or(body.prompt.as_ref())
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .ok_or_else(|| GatewayError::missing_field("text"))?;
            let voice = require(body.voice.as_ref(), "voice")?;
            Ok(synthesize_speech(&state, text, voice, body.speed, body.provider.clone()).await?)
        }
    }
}

async fn image(state: &AppState, body: OrchestratorBody) -> GatewayResult<ImageResult> {
    let prompt = require(body.prompt.as_ref(), "prompt")?.to_string();
    let decision = state.router.route(&GenerationRequest::new(MediaKind::Image, &prompt))?;
    let model = decision.model.model_id();

    let request = ImageRequest {
        prompt: prompt.clone(),
        aspect_ratio: body.aspect_ratio,
        reference_images: body.reference_images,
    };
    let url = generate_image_url(state, &request).await?;

    Ok(ImageResult {
        asset: Asset::draft(MediaKind::Image, &url, prompt, model),
        url,
        model: model.to_string(),
    })
}

fn video_request(body: &OrchestratorBody, prompt: &str) -> GatewayResult<GenerationRequest> {
    let preference = body
        .model
        .as_deref()
        .map(str::parse::<ModelPreference>)
        .transpose()?
        .unwrap_or_default();

    let mut request = GenerationRequest::new(MediaKind::Video, prompt)
        .with_preference(preference)
        .with_tags(&body.tags);
    request.source_image_url = body.image_url.clone();
    request.source_image_end_url = body.image_end_url.clone();
    request.source_audio_url = body.audio_url.clone();
    request.duration_hint = body.duration;
    request.aspect_ratio = body.aspect_ratio.clone();
    Ok(request)
}

async fn video(state: &AppState, body: OrchestratorBody) -> GatewayResult<JobResponse> {
    let prompt = require(body.prompt.as_ref(), "prompt")?;
    let request = video_request(&body, prompt)?;
    let decision = state.router.route(&request)?;
    let model = decision
        .video_model()
        .ok_or_else(|| GatewayError::internal("video route without a video model"))?;

    let result = run_video(state, model, &request, body.wait.unwrap_or(true)).await;
    state.record(MediaKind::Video.as_str(), model.model_id(), &result);
    let response = result?;

    info!(
        model = model.model_id(),
        reason = ?decision.reason,
        vendor_request_id = %response.request_id,
        status = %response.status.as_str(),
        "Video request handled"
    );
    Ok(response)
}

async fn run_video(
    state: &AppState,
    model: VideoModel,
    request: &GenerationRequest,
    wait: bool,
) -> GatewayResult<JobResponse> {
    let generator = state.providers.video(model)?;
    let mut job = generator.submit(model, &request.to_video_request()).await?;

    if !wait {
        return Ok(JobResponse {
            request_id: job.request_id.clone(),
            model: model.model_id().to_string(),
            status: job.status(),
            url: None,
            error: None,
            asset: None,
        });
    }

    let outcome = match state.poller.poll(generator.as_ref(), &mut job).await {
        Ok(outcome) => outcome,
        Err(err) => {
            if let GatewayError::GenerationTimeout { attempts, .. } = &err {
                state.metrics.observe_poll_iterations(*attempts);
            }
            return Err(err);
        }
    };
    state.metrics.observe_poll_iterations(outcome.iterations);

    let asset = Asset::draft(MediaKind::Video, &outcome.url, &request.prompt, model.model_id())
        .with_job_id(&job.request_id);

    Ok(JobResponse {
        request_id: job.request_id,
        model: model.model_id().to_string(),
        status: JobStatus::Completed,
        url: Some(outcome.url),
        error: None,
        asset: Some(asset),
    })
}

async fn job_status(state: &AppState, body: &OrchestratorBody) -> GatewayResult<JobResponse> {
    let request_id = require(body.request_id.as_ref(), "requestId")?;
    let model_id = require(body.model.as_ref(), "model")?;
    let model = VideoModel::from_model_id(model_id)
        .ok_or_else(|| GatewayError::invalid_field("model", format!("Unknown model: {model_id}")))?;

    let generator = state.providers.video(model)?;
    let job = GenerationJob::queued(request_id, model);
    let report = generator.check_status(&job).await?;

    let url = match report.status {
        JobStatus::Completed => Some(report.url_str().map(str::to_string).ok_or_else(|| {
            GatewayError::invalid_shape(
                generator.vendor().as_str(),
                "completed job has no video URL string",
            )
        })?),
        _ => None,
    };

    Ok(JobResponse {
        request_id: job.request_id,
        model: model.model_id().to_string(),
        status: report.status,
        url,
        error: report.error,
        asset: None,
    })
}
