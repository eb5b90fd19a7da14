//! HTTP wire types shared by the server and the SDK.
//!
//! Required fields are `Option`s so that a missing field produces the
//! gateway's own `Missing required parameter` 400 rather than a serde
//! rejection.

use crate::asset::Asset;
use crate::error::{GatewayError, GatewayResult};
use crate::job::JobStatus;
use serde::{Deserialize, Serialize};

/// Return the trimmed value of a required string field
pub fn require<'a>(value: Option<&'a String>, field: &str) -> GatewayResult<&'a str> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| GatewayError::missing_field(field))
}

/// `POST /api/generate-image`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageBody {
    /// Prompt text
    pub prompt: Option<String>,
    /// Aspect ratio such as `16:9`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    /// Style and character references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_images: Vec<String>,
}

/// `POST /api/generate-audio`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAudioBody {
    /// Text to speak
    pub text: Option<String>,
    /// Voice name or vendor voice id
    pub voice: Option<String>,
    /// Playback speed multiplier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    /// `elevenlabs` or anything else for the default vendor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Video endpoint action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoAction {
    /// Submit a generation
    #[default]
    Create,
    /// Query a generation
    Status,
}

/// `POST /api/generate-video`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoBody {
    /// Prompt text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Start frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// End frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_end_url: Option<String>,
    /// Aspect ratio such as `16:9`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    /// Duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// What to do
    #[serde(default)]
    pub action: VideoAction,
    /// Generation id for `status`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_id: Option<String>,
}

/// `POST /api/orchestrator`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorBody {
    /// `image`, `video`, `audio` or `status`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Model preference on create, model id on status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Prompt text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Start frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// End frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_end_url: Option<String>,
    /// Voice track for lip-sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Content tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Aspect ratio such as `16:9`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    /// Image references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_images: Vec<String>,
    /// Text to speak
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Voice name or vendor voice id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    /// Playback speed multiplier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    /// Speech provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Job id for `status`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Block until the video job finishes (default `true`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<bool>,
}

/// `POST /api/mux-video`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuxVideoBody {
    /// Generated video
    pub video_url: Option<String>,
    /// Dialogue track
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Background music
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgm_url: Option<String>,
}

/// `POST /api/gemini`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextBody {
    /// Prompt text
    pub prompt: Option<String>,
}

/// `GET /api/proxy-image`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyQuery {
    /// Upstream URL
    pub url: Option<String>,
}

/// `{url}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlResponse {
    /// Result URL
    pub url: String,
}

/// `{result}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResponse {
    /// Generated text
    pub result: String,
}

/// `{error}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error message
    pub error: String,
}

/// Orchestrator image result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    /// Result URL
    pub url: String,
    /// Model id
    pub model: String,
    /// Asset draft
    pub asset: Asset,
}

/// Orchestrator video/status result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    /// Vendor job id
    pub request_id: String,
    /// Model id
    pub model: String,
    /// Job status
    pub status: JobStatus,
    /// Result URL once completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Asset draft once completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<Asset>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_blank() {
        let blank = Some("   ".to_string());
        let err = require(blank.as_ref(), "prompt").unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: Missing required parameter: prompt");
        assert!(require(None, "prompt").is_err());
        let ok = Some(" hi ".to_string());
        assert_eq!(require(ok.as_ref(), "prompt").unwrap(), "hi");
    }

    #[test]
    fn test_orchestrator_body_camel_case() {
        let body: OrchestratorBody = serde_json::from_str(
            r#"{"type":"video","model":"fast","imageUrl":"https://i","audioUrl":"https://a","tags":["Action"],"wait":false}"#,
        )
        .unwrap();
        assert_eq!(body.kind.as_deref(), Some("video"));
        assert_eq!(body.image_url.as_deref(), Some("https://i"));
        assert_eq!(body.audio_url.as_deref(), Some("https://a"));
        assert_eq!(body.wait, Some(false));
    }

    #[test]
    fn test_video_action_defaults_to_create() {
        let body: GenerateVideoBody = serde_json::from_str(r#"{"prompt":"x"}"#).unwrap();
        assert_eq!(body.action, VideoAction::Create);
        let body: GenerateVideoBody =
            serde_json::from_str(r#"{"action":"status","generationId":"g1"}"#).unwrap();
        assert_eq!(body.action, VideoAction::Status);
        assert_eq!(body.generation_id.as_deref(), Some("g1"));
    }
}
