//! Provider router.
//!
//! Maps a [`GenerationRequest`] to exactly one vendor model. Routing is a
//! pure function of the request: no I/O, no state, same answer every time.

use serde::Serialize;
use std::collections::BTreeSet;
use studio_core::{
    ExplicitVendor, GatewayResult, GenerationRequest, ImageModel, MediaKind, ModelPreference,
    ModelRoute, SpeechModel, VideoModel,
};
use tracing::debug;

/// Voice ids longer than this are ElevenLabs voice ids; OpenAI voice names
/// (`alloy`, `nova`, ...) are all shorter.
pub const ELEVENLABS_VOICE_ID_MIN_LEN: usize = 10;

/// Why a model was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteReason {
    /// Image and voice both supplied, lip-sync is mandatory
    ForcedLipSync,
    /// Caller named the vendor
    Explicit,
    /// Caller asked for speed
    Fast,
    /// Caller asked for fidelity
    Quality,
    /// Auto, and a tag called for the high-fidelity vendor
    AutoTagged,
    /// Auto, nothing matched
    AutoFallback,
    /// Kind has a single default model
    Default,
    /// Speech provider named by the caller
    ExplicitProvider,
    /// Speech provider inferred from the voice id shape
    VoiceIdHeuristic,
}

/// Routing result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDecision {
    /// Selected model
    pub model: ModelRoute,
    /// Rule that selected it
    pub reason: RouteReason,
}

impl RouteDecision {
    fn new(model: ModelRoute, reason: RouteReason) -> Self {
        Self { model, reason }
    }

    /// The selected video model, if this was a video route
    #[must_use]
    pub fn video_model(&self) -> Option<VideoModel> {
        match self.model {
            ModelRoute::Video(m) => Some(m),
            _ => None,
        }
    }

    /// The selected speech model, if this was an audio route
    #[must_use]
    pub fn speech_model(&self) -> Option<SpeechModel> {
        match self.model {
            ModelRoute::Audio(m) => Some(m),
            _ => None,
        }
    }
}

/// Router configuration
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Tags that call for the high-fidelity video vendor under `auto`
    pub quality_tags: BTreeSet<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            quality_tags: ["character", "dialogue", "action", "physics"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl RouterConfig {
    /// Create a default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the quality tag set
    #[must_use]
    pub fn with_quality_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.quality_tags = tags.into_iter().map(|t| t.into().to_lowercase()).collect();
        self
    }
}

/// The provider router
#[derive(Debug, Clone, Default)]
pub struct ProviderRouter {
    config: RouterConfig,
}

impl ProviderRouter {
    /// Create a router
    #[must_use]
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    /// Route a request
    pub fn route(&self, request: &GenerationRequest) -> GatewayResult<RouteDecision> {
        let decision = match request.kind {
            MediaKind::Image => RouteDecision::new(
                ModelRoute::Image(ImageModel::FluxProUltra),
                RouteReason::Default,
            ),
            MediaKind::Video => self.route_video(request),
            MediaKind::Audio => Self::route_audio(request),
        };

        debug!(
            kind = %request.kind,
            preference = %request.model_preference,
            model = decision.model.model_id(),
            reason = ?decision.reason,
            "Routed generation request"
        );

        Ok(decision)
    }

    /// Route a request whose kind arrives as a string
    pub fn route_kind(&self, kind: &str, request: GenerationRequest) -> GatewayResult<RouteDecision> {
        let kind: MediaKind = kind.parse()?;
        self.route(&GenerationRequest { kind, ..request })
    }

    fn route_video(&self, request: &GenerationRequest) -> RouteDecision {
        let with_image = request.has_source_image();

        if with_image && request.has_source_audio() {
            return RouteDecision::new(
                ModelRoute::Video(VideoModel::KlingAvatar),
                RouteReason::ForcedLipSync,
            );
        }

        let (model, reason) = match request.model_preference {
            ModelPreference::Explicit(vendor) => {
                (Self::explicit_video(vendor, with_image), RouteReason::Explicit)
            }
            ModelPreference::Fast => (Self::fast_video(with_image), RouteReason::Fast),
            ModelPreference::Quality => (Self::quality_video(with_image), RouteReason::Quality),
            ModelPreference::Auto => {
                if request.tags.iter().any(|t| self.config.quality_tags.contains(t)) {
                    (Self::quality_video(with_image), RouteReason::AutoTagged)
                } else {
                    // Untagged requests also land on the quality vendor; it is
                    // the more stable of the two.
                    (Self::quality_video(with_image), RouteReason::AutoFallback)
                }
            }
        };

        RouteDecision::new(ModelRoute::Video(model), reason)
    }

    fn explicit_video(vendor: ExplicitVendor, with_image: bool) -> VideoModel {
        match (vendor, with_image) {
            (ExplicitVendor::Kling, true) => VideoModel::KlingImage,
            (ExplicitVendor::Kling, false) => VideoModel::KlingText,
            (ExplicitVendor::Luma, true) => VideoModel::LumaRay2Image,
            (ExplicitVendor::Luma, false) => VideoModel::LumaRay2Text,
            (ExplicitVendor::Minimax, true) => VideoModel::MinimaxImage,
            (ExplicitVendor::Minimax, false) => VideoModel::MinimaxText,
        }
    }

    fn fast_video(with_image: bool) -> VideoModel {
        if with_image {
            VideoModel::LumaFlashImage
        } else {
            VideoModel::LumaFlashText
        }
    }

    fn quality_video(with_image: bool) -> VideoModel {
        if with_image {
            VideoModel::KlingImage
        } else {
            VideoModel::KlingText
        }
    }

    fn route_audio(request: &GenerationRequest) -> RouteDecision {
        let provider = request
            .speech_provider
            .as_deref()
            .map(|p| p.trim().to_ascii_lowercase());

        if provider.as_deref() == Some("elevenlabs") {
            return RouteDecision::new(
                ModelRoute::Audio(SpeechModel::ElevenMultilingualV2),
                RouteReason::ExplicitProvider,
            );
        }

        if request
            .voice
            .as_deref()
            .is_some_and(|v| v.len() > ELEVENLABS_VOICE_ID_MIN_LEN)
        {
            return RouteDecision::new(
                ModelRoute::Audio(SpeechModel::ElevenMultilingualV2),
                RouteReason::VoiceIdHeuristic,
            );
        }

        RouteDecision::new(ModelRoute::Audio(SpeechModel::OpenAiTts1), RouteReason::Default)
    }
}
