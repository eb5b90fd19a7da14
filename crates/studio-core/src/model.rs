//! Vendor and model identifiers.
//!
//! Model ids are the opaque strings handed back to clients; each enum
//! round-trips through [`VideoModel::from_model_id`] and friends so a later
//! status call can be addressed to the vendor that created the job.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    /// fal.ai (Flux, Kling, MiniMax)
    Fal,
    /// Luma Dream Machine
    Luma,
    /// OpenAI speech
    OpenAi,
    /// ElevenLabs speech
    ElevenLabs,
    /// Google Gemini text generation
    Gemini,
}

impl Vendor {
    /// Stable lowercase name, used in logs, metrics and error bodies
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fal => "fal",
            Self::Luma => "luma",
            Self::OpenAi => "openai",
            Self::ElevenLabs => "elevenlabs",
            Self::Gemini => "gemini",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image generation model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageModel {
    /// Flux Pro 1.1 Ultra on fal.ai
    FluxProUltra,
}

impl ImageModel {
    /// Vendor model id
    #[must_use]
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::FluxProUltra => "fal-ai/flux-pro/v1.1-ultra",
        }
    }

    /// Vendor hosting the model
    #[must_use]
    pub fn vendor(&self) -> Vendor {
        Vendor::Fal
    }
}

/// Video generation model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoModel {
    /// Kling avatar: image + audio, lip-synced
    KlingAvatar,
    /// Kling 2.1 Master, image-conditioned
    KlingImage,
    /// Kling 2.1 Master, text-conditioned
    KlingText,
    /// MiniMax Hailuo 02, image-conditioned
    MinimaxImage,
    /// MiniMax Hailuo 02, text-conditioned
    MinimaxText,
    /// Luma Ray 2, image-conditioned
    LumaRay2Image,
    /// Luma Ray 2, text-conditioned
    LumaRay2Text,
    /// Luma Ray Flash 2, image-conditioned
    LumaFlashImage,
    /// Luma Ray Flash 2, text-conditioned
    LumaFlashText,
}

impl VideoModel {
    /// Every video model, in routing table order
    pub const ALL: [Self; 9] = [
        Self::KlingAvatar,
        Self::KlingImage,
        Self::KlingText,
        Self::MinimaxImage,
        Self::MinimaxText,
        Self::LumaRay2Image,
        Self::LumaRay2Text,
        Self::LumaFlashImage,
        Self::LumaFlashText,
    ];

    /// Opaque model id
    #[must_use]
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::KlingAvatar => "fal-ai/kling-video/v1/pro/ai-avatar",
            Self::KlingImage => "fal-ai/kling-video/v2.1/master/image-to-video",
            Self::KlingText => "fal-ai/kling-video/v2.1/master/text-to-video",
            Self::MinimaxImage => "fal-ai/minimax/hailuo-02/standard/image-to-video",
            Self::MinimaxText => "fal-ai/minimax/hailuo-02/standard/text-to-video",
            Self::LumaRay2Image => "luma/ray-2/image-to-video",
            Self::LumaRay2Text => "luma/ray-2/text-to-video",
            Self::LumaFlashImage => "luma/ray-flash-2/image-to-video",
            Self::LumaFlashText => "luma/ray-flash-2/text-to-video",
        }
    }

    /// Parse an opaque model id back into a model
    #[must_use]
    pub fn from_model_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.model_id() == id)
    }

    /// Vendor hosting the model
    #[must_use]
    pub fn vendor(&self) -> Vendor {
        match self {
            Self::LumaRay2Image | Self::LumaRay2Text | Self::LumaFlashImage | Self::LumaFlashText => {
                Vendor::Luma
            }
            _ => Vendor::Fal,
        }
    }

    /// Whether the model expects a start frame
    #[must_use]
    pub fn is_image_conditioned(&self) -> bool {
        matches!(
            self,
            Self::KlingAvatar
                | Self::KlingImage
                | Self::MinimaxImage
                | Self::LumaRay2Image
                | Self::LumaFlashImage
        )
    }

    /// Whether the model conditions mouth movement on an audio track
    #[must_use]
    pub fn is_lip_sync(&self) -> bool {
        matches!(self, Self::KlingAvatar)
    }
}

impl fmt::Display for VideoModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model_id())
    }
}

/// Text-to-speech model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeechModel {
    /// OpenAI `tts-1`
    OpenAiTts1,
    /// ElevenLabs multilingual v2
    ElevenMultilingualV2,
}

impl SpeechModel {
    /// Vendor model id
    #[must_use]
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::OpenAiTts1 => "tts-1",
            Self::ElevenMultilingualV2 => "eleven_multilingual_v2",
        }
    }

    /// Vendor hosting the model
    #[must_use]
    pub fn vendor(&self) -> Vendor {
        match self {
            Self::OpenAiTts1 => Vendor::OpenAi,
            Self::ElevenMultilingualV2 => Vendor::ElevenLabs,
        }
    }
}

/// Model chosen by the router for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelRoute {
    /// Image generation
    Image(ImageModel),
    /// Video generation
    Video(VideoModel),
    /// Speech synthesis
    Audio(SpeechModel),
}

impl ModelRoute {
    /// Opaque model id
    #[must_use]
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::Image(m) => m.model_id(),
            Self::Video(m) => m.model_id(),
            Self::Audio(m) => m.model_id(),
        }
    }

    /// Vendor hosting the model
    #[must_use]
    pub fn vendor(&self) -> Vendor {
        match self {
            Self::Image(m) => m.vendor(),
            Self::Video(m) => m.vendor(),
            Self::Audio(m) => m.vendor(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_video_model_ids_round_trip() {
        for model in VideoModel::ALL {
            assert_eq!(VideoModel::from_model_id(model.model_id()), Some(model));
        }
        assert_eq!(VideoModel::from_model_id("fal-ai/unknown"), None);
    }

    #[test]
    fn test_video_model_ids_are_unique() {
        let ids: HashSet<_> = VideoModel::ALL.iter().map(VideoModel::model_id).collect();
        assert_eq!(ids.len(), VideoModel::ALL.len());
    }

    #[test]
    fn test_vendor_assignment() {
        assert_eq!(VideoModel::KlingAvatar.vendor(), Vendor::Fal);
        assert_eq!(VideoModel::LumaFlashText.vendor(), Vendor::Luma);
        assert_eq!(SpeechModel::ElevenMultilingualV2.vendor(), Vendor::ElevenLabs);
        assert_eq!(
            ModelRoute::Image(ImageModel::FluxProUltra).vendor(),
            Vendor::Fal
        );
    }

    #[test]
    fn test_lip_sync_model_is_image_conditioned() {
        assert!(VideoModel::KlingAvatar.is_lip_sync());
        assert!(VideoModel::KlingAvatar.is_image_conditioned());
        assert!(!VideoModel::KlingText.is_image_conditioned());
    }
}
