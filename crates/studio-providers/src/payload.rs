//! Outbound vendor payloads.
//!
//! Each vendor body is a typed struct; [`VendorRequest`] is the union of all
//! of them and serialises as the bare vendor body. Building video payloads
//! happens here rather than in the adapters so that the model-specific
//! rules (duration snapping, keyframes, lip-sync inputs) live in one place.

use serde::Serialize;
use studio_core::{ImageRequest, SpeechModel, SpeechRequest, Vendor, VideoModel, VideoRequest};

/// Durations Kling accepts, in seconds
pub const KLING_DURATIONS: [u32; 2] = [5, 10];
/// Durations MiniMax accepts, in seconds
pub const MINIMAX_DURATIONS: [u32; 2] = [6, 10];
/// Durations Luma accepts, in seconds
pub const LUMA_DURATIONS: [u32; 2] = [5, 9];

const DEFAULT_ASPECT_RATIO: &str = "16:9";
const REFERENCE_IMAGE_STRENGTH: f64 = 0.1;

/// Snap a duration hint to the nearest allowed value; ties go to the
/// shorter duration and an absent hint picks the first option
#[must_use]
pub fn snap_duration(allowed: &[u32], hint: Option<u32>) -> u32 {
    let Some(hint) = hint else {
        return allowed.first().copied().unwrap_or_default();
    };
    allowed
        .iter()
        .copied()
        .min_by_key(|d| (d.abs_diff(hint), *d))
        .unwrap_or(hint)
}

/// fal.ai Flux Pro Ultra body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FluxImagePayload {
    /// Prompt
    pub prompt: String,
    /// Aspect ratio
    pub aspect_ratio: String,
    /// Always one
    pub num_images: u32,
    /// Always `jpeg`
    pub output_format: &'static str,
    /// First style or character reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Reference influence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_prompt_strength: Option<f64>,
}

/// fal.ai Kling 2.1 body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KlingVideoPayload {
    /// Prompt
    pub prompt: String,
    /// `"5"` or `"10"`
    pub duration: String,
    /// Aspect ratio
    pub aspect_ratio: String,
    /// Start frame for image-to-video
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// End frame for image-to-video
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail_image_url: Option<String>,
}

/// fal.ai Kling AI avatar (lip-sync) body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KlingAvatarPayload {
    /// Face image
    pub image_url: String,
    /// Voice track
    pub audio_url: String,
    /// Optional direction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// fal.ai MiniMax Hailuo 02 body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinimaxVideoPayload {
    /// Prompt
    pub prompt: String,
    /// `"6"` or `"10"`
    pub duration: String,
    /// Let the vendor rewrite the prompt
    pub prompt_optimizer: bool,
    /// Start frame for image-to-video
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Luma keyframe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LumaKeyframe {
    /// Always `image`
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Frame URL
    pub url: String,
}

impl LumaKeyframe {
    fn image(url: impl Into<String>) -> Self {
        Self {
            kind: "image",
            url: url.into(),
        }
    }
}

/// Luma start and end frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LumaKeyframes {
    /// Start frame
    pub frame0: LumaKeyframe,
    /// End frame
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame1: Option<LumaKeyframe>,
}

/// Luma Dream Machine generation body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LumaGenerationPayload {
    /// Prompt
    pub prompt: String,
    /// `ray-2` or `ray-flash-2`
    pub model: String,
    /// Aspect ratio
    pub aspect_ratio: String,
    /// `"5s"` or `"9s"`
    pub duration: String,
    /// Start/end frames for image-to-video
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyframes: Option<LumaKeyframes>,
}

/// OpenAI speech body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenAiSpeechPayload {
    /// `tts-1`
    pub model: &'static str,
    /// Text
    pub input: String,
    /// Voice name
    pub voice: String,
    /// Speed multiplier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    /// Always `mp3`
    pub response_format: &'static str,
}

/// ElevenLabs voice settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceSettings {
    /// Stability
    pub stability: f32,
    /// Similarity boost
    pub similarity_boost: f32,
    /// Speed multiplier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

/// ElevenLabs speech body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElevenLabsSpeechPayload {
    /// Text
    pub text: String,
    /// `eleven_multilingual_v2`
    pub model_id: &'static str,
    /// Voice settings
    pub voice_settings: VoiceSettings,
}

/// Gemini text part
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeminiPart {
    /// Text
    pub text: String,
}

/// Gemini content block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeminiContent {
    /// Parts
    pub parts: Vec<GeminiPart>,
}

/// Gemini `generateContent` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeminiTextPayload {
    /// Contents
    pub contents: Vec<GeminiContent>,
}

/// Every outbound vendor body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VendorRequest {
    /// fal.ai Flux image
    FluxImage(FluxImagePayload),
    /// fal.ai Kling video
    KlingVideo(KlingVideoPayload),
    /// fal.ai Kling lip-sync
    KlingAvatar(KlingAvatarPayload),
    /// fal.ai MiniMax video
    MinimaxVideo(MinimaxVideoPayload),
    /// Luma generation
    LumaGeneration(LumaGenerationPayload),
    /// OpenAI speech
    OpenAiSpeech(OpenAiSpeechPayload),
    /// ElevenLabs speech
    ElevenLabsSpeech(ElevenLabsSpeechPayload),
    /// Gemini text
    GeminiText(GeminiTextPayload),
}

impl VendorRequest {
    /// Vendor that receives this body
    #[must_use]
    pub fn vendor(&self) -> Vendor {
        match self {
            Self::FluxImage(_) | Self::KlingVideo(_) | Self::KlingAvatar(_) | Self::MinimaxVideo(_) => {
                Vendor::Fal
            }
            Self::LumaGeneration(_) => Vendor::Luma,
            Self::OpenAiSpeech(_) => Vendor::OpenAi,
            Self::ElevenLabsSpeech(_) => Vendor::ElevenLabs,
            Self::GeminiText(_) => Vendor::Gemini,
        }
    }

    /// Flux image body
    #[must_use]
    pub fn image(request: &ImageRequest) -> Self {
        let image_url = request.reference_images.first().cloned();
        Self::FluxImage(FluxImagePayload {
            prompt: request.prompt.clone(),
            aspect_ratio: aspect_ratio(request.aspect_ratio.as_deref()),
            num_images: 1,
            output_format: "jpeg",
            image_prompt_strength: image_url.as_ref().map(|_| REFERENCE_IMAGE_STRENGTH),
            image_url,
        })
    }

    /// Video body for the given model
    #[must_use]
    pub fn video(model: VideoModel, request: &VideoRequest) -> Self {
        let prompt = request.prompt.clone();
        let ratio = aspect_ratio(request.aspect_ratio.as_deref());
        let image_url = if model.is_image_conditioned() {
            request.image_url.clone()
        } else {
            None
        };

        match model {
            VideoModel::KlingAvatar => Self::KlingAvatar(KlingAvatarPayload {
                image_url: request.image_url.clone().unwrap_or_default(),
                audio_url: request.audio_url.clone().unwrap_or_default(),
                prompt: Some(prompt).filter(|p| !p.trim().is_empty()),
            }),
            VideoModel::KlingImage | VideoModel::KlingText => Self::KlingVideo(KlingVideoPayload {
                prompt,
                duration: snap_duration(&KLING_DURATIONS, request.duration).to_string(),
                aspect_ratio: ratio,
                tail_image_url: image_url.as_ref().and(request.image_end_url.clone()),
                image_url,
            }),
            VideoModel::MinimaxImage | VideoModel::MinimaxText => {
                Self::MinimaxVideo(MinimaxVideoPayload {
                    prompt,
                    duration: snap_duration(&MINIMAX_DURATIONS, request.duration).to_string(),
                    prompt_optimizer: true,
                    image_url,
                })
            }
            VideoModel::LumaRay2Image
            | VideoModel::LumaRay2Text
            | VideoModel::LumaFlashImage
            | VideoModel::LumaFlashText => Self::LumaGeneration(LumaGenerationPayload {
                prompt,
                model: luma_model_name(model).to_string(),
                aspect_ratio: ratio,
                duration: format!("{}s", snap_duration(&LUMA_DURATIONS, request.duration)),
                keyframes: image_url.map(|start| LumaKeyframes {
                    frame0: LumaKeyframe::image(start),
                    frame1: request.image_end_url.clone().map(LumaKeyframe::image),
                }),
            }),
        }
    }

    /// Speech body for the given model
    #[must_use]
    pub fn speech(model: SpeechModel, request: &SpeechRequest) -> Self {
        match model {
            SpeechModel::OpenAiTts1 => Self::OpenAiSpeech(OpenAiSpeechPayload {
                model: model.model_id(),
                input: request.text.clone(),
                voice: request.voice.clone(),
                speed: request.speed,
                response_format: "mp3",
            }),
            SpeechModel::ElevenMultilingualV2 => Self::ElevenLabsSpeech(ElevenLabsSpeechPayload {
                text: request.text.clone(),
                model_id: model.model_id(),
                voice_settings: VoiceSettings {
                    stability: 0.5,
                    similarity_boost: 0.75,
                    speed: request.speed,
                },
            }),
        }
    }

    /// Gemini body
    #[must_use]
    pub fn text(prompt: &str) -> Self {
        Self::GeminiText(GeminiTextPayload {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        })
    }
}

/// Luma's own model name for a Luma video model
#[must_use]
pub fn luma_model_name(model: VideoModel) -> &'static str {
    match model {
        VideoModel::LumaFlashImage | VideoModel::LumaFlashText => "ray-flash-2",
        _ => "ray-2",
    }
}

fn aspect_ratio(requested: Option<&str>) -> String {
    requested
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_ASPECT_RATIO)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn video_request() -> VideoRequest {
        VideoRequest {
            prompt: "a duel at dawn".to_string(),
            ..VideoRequest::default()
        }
    }

    #[test]
    fn test_snap_duration() {
        assert_eq!(snap_duration(&KLING_DURATIONS, None), 5);
        assert_eq!(snap_duration(&KLING_DURATIONS, Some(7)), 5);
        assert_eq!(snap_duration(&KLING_DURATIONS, Some(8)), 10);
        assert_eq!(snap_duration(&KLING_DURATIONS, Some(30)), 10);
        assert_eq!(snap_duration(&MINIMAX_DURATIONS, Some(8)), 6);
        assert_eq!(snap_duration(&MINIMAX_DURATIONS, Some(5)), 6);
        assert_eq!(snap_duration(&LUMA_DURATIONS, Some(10)), 9);
    }

    #[test]
    fn test_flux_payload_uses_first_reference() {
        let mut request = ImageRequest::new("castle");
        request.reference_images = vec!["https://ref/1.png".into(), "https://ref/2.png".into()];
        let body = serde_json::to_value(VendorRequest::image(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "prompt": "castle",
                "aspect_ratio": "16:9",
                "num_images": 1,
                "output_format": "jpeg",
                "image_url": "https://ref/1.png",
                "image_prompt_strength": 0.1
            })
        );
    }

    #[test]
    fn test_flux_payload_without_reference() {
        let body = serde_json::to_value(VendorRequest::image(&ImageRequest::new("castle"))).unwrap();
        assert!(body.get("image_url").is_none());
        assert!(body.get("image_prompt_strength").is_none());
    }

    #[test]
    fn test_luma_keyframes() {
        let mut request = video_request();
        request.image_url = Some("https://img/start.png".into());
        request.image_end_url = Some("https://img/end.png".into());
        request.duration = Some(8);

        let body = serde_json::to_value(VendorRequest::video(VideoModel::LumaFlashImage, &request)).unwrap();
        assert_eq!(body["model"], "ray-flash-2");
        assert_eq!(body["duration"], "9s");
        assert_eq!(body["keyframes"]["frame0"], json!({"type": "image", "url": "https://img/start.png"}));
        assert_eq!(body["keyframes"]["frame1"]["url"], "https://img/end.png");
    }

    #[test]
    fn test_text_variant_drops_image() {
        let mut request = video_request();
        request.image_url = Some("https://img/start.png".into());

        let body = serde_json::to_value(VendorRequest::video(VideoModel::LumaRay2Text, &request)).unwrap();
        assert!(body.get("keyframes").is_none());

        let body = serde_json::to_value(VendorRequest::video(VideoModel::KlingText, &request)).unwrap();
        assert!(body.get("image_url").is_none());
    }

    #[test]
    fn test_kling_and_minimax_durations_are_strings() {
        let mut request = video_request();
        request.duration = Some(10);
        let kling = serde_json::to_value(VendorRequest::video(VideoModel::KlingText, &request)).unwrap();
        assert_eq!(kling["duration"], "10");

        let minimax = serde_json::to_value(VendorRequest::video(VideoModel::MinimaxText, &request)).unwrap();
        assert_eq!(minimax["duration"], "10");
        assert_eq!(minimax["prompt_optimizer"], true);
    }

    #[test]
    fn test_avatar_payload() {
        let mut request = video_request();
        request.image_url = Some("https://img/face.png".into());
        request.audio_url = Some("https://audio/line.mp3".into());
        let payload = VendorRequest::video(VideoModel::KlingAvatar, &request);
        assert_eq!(payload.vendor(), Vendor::Fal);
        let body = serde_json::to_value(payload).unwrap();
        assert_eq!(body["image_url"], "https://img/face.png");
        assert_eq!(body["audio_url"], "https://audio/line.mp3");
    }

    #[test]
    fn test_speech_payloads() {
        let request = SpeechRequest {
            text: "Hello".into(),
            voice: "alloy".into(),
            speed: None,
        };
        let openai = serde_json::to_value(VendorRequest::speech(SpeechModel::OpenAiTts1, &request)).unwrap();
        assert_eq!(
            openai,
            json!({"model": "tts-1", "input": "Hello", "voice": "alloy", "response_format": "mp3"})
        );

        let eleven =
            serde_json::to_value(VendorRequest::speech(SpeechModel::ElevenMultilingualV2, &request)).unwrap();
        assert_eq!(eleven["model_id"], "eleven_multilingual_v2");
        assert_eq!(eleven["voice_settings"]["stability"], 0.5);
        assert_eq!(eleven["voice_settings"]["similarity_boost"], 0.75);
    }

    #[test]
    fn test_gemini_payload() {
        let body = serde_json::to_value(VendorRequest::text("Outline act one")).unwrap();
        assert_eq!(body, json!({"contents": [{"parts": [{"text": "Outline act one"}]}]}));
    }
}
