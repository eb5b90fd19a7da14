//! Generation request types.
//!
//! [`GenerationRequest`] is what the router looks at. The per-kind request
//! structs ([`ImageRequest`], [`VideoRequest`], [`SpeechRequest`],
//! [`TextRequest`]) are what the vendor adapters consume.

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Kind of media being generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image
    Image,
    /// Video clip
    Video,
    /// Spoken audio
    Audio,
}

impl MediaKind {
    /// Lowercase name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl FromStr for MediaKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            other => Err(GatewayError::InvalidRequestKind {
                kind: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Video vendor a caller can ask for by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplicitVendor {
    /// Kling 2.1 Master
    Kling,
    /// Luma Ray 2
    Luma,
    /// MiniMax Hailuo 02
    Minimax,
}

impl ExplicitVendor {
    /// Name as accepted on the wire
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kling => "kling",
            Self::Luma => "luma",
            Self::Minimax => "minimax",
        }
    }
}

/// Caller's model preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelPreference {
    /// Low latency vendor
    Fast,
    /// High fidelity vendor
    Quality,
    /// Let the router decide
    #[default]
    Auto,
    /// A specific vendor
    Explicit(ExplicitVendor),
}

impl FromStr for ModelPreference {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "fast" => Ok(Self::Fast),
            "quality" => Ok(Self::Quality),
            "kling" => Ok(Self::Explicit(ExplicitVendor::Kling)),
            "luma" => Ok(Self::Explicit(ExplicitVendor::Luma)),
            "minimax" => Ok(Self::Explicit(ExplicitVendor::Minimax)),
            other => Err(GatewayError::invalid_field(
                "model",
                format!("Unknown model preference: {other}"),
            )),
        }
    }
}

impl fmt::Display for ModelPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => f.write_str("fast"),
            Self::Quality => f.write_str("quality"),
            Self::Auto => f.write_str("auto"),
            Self::Explicit(v) => f.write_str(v.as_str()),
        }
    }
}

/// Routing input, constructed per call and never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// What to generate
    pub kind: MediaKind,
    /// Prompt text (speech text for audio)
    pub prompt: String,
    /// Start frame for video
    pub source_image_url: Option<String>,
    /// End frame for video
    pub source_image_end_url: Option<String>,
    /// Voice track for lip-sync
    pub source_audio_url: Option<String>,
    /// Lowercase content tags
    pub tags: BTreeSet<String>,
    /// Model preference
    pub model_preference: ModelPreference,
    /// Requested duration in seconds
    pub duration_hint: Option<u32>,
    /// Aspect ratio such as `16:9`
    pub aspect_ratio: Option<String>,
    /// Explicit speech provider
    pub speech_provider: Option<String>,
    /// Voice identifier
    pub voice: Option<String>,
}

impl GenerationRequest {
    /// Start a request of the given kind
    #[must_use]
    pub fn new(kind: MediaKind, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
            source_image_url: None,
            source_image_end_url: None,
            source_audio_url: None,
            tags: BTreeSet::new(),
            model_preference: ModelPreference::Auto,
            duration_hint: None,
            aspect_ratio: None,
            speech_provider: None,
            voice: None,
        }
    }

    /// Set the start frame
    #[must_use]
    pub fn with_source_image(mut self, url: impl Into<String>) -> Self {
        self.source_image_url = Some(url.into());
        self
    }

    /// Set the end frame
    #[must_use]
    pub fn with_source_image_end(mut self, url: impl Into<String>) -> Self {
        self.source_image_end_url = Some(url.into());
        self
    }

    /// Set the voice track
    #[must_use]
    pub fn with_source_audio(mut self, url: impl Into<String>) -> Self {
        self.source_audio_url = Some(url.into());
        self
    }

    /// Add tags; they are lowercased and trimmed
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags.extend(
            tags.into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty()),
        );
        self
    }

    /// Set the model preference
    #[must_use]
    pub fn with_preference(mut self, preference: ModelPreference) -> Self {
        self.model_preference = preference;
        self
    }

    /// Set the duration hint
    #[must_use]
    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration_hint = Some(seconds);
        self
    }

    /// Set the aspect ratio
    #[must_use]
    pub fn with_aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(ratio.into());
        self
    }

    /// Set the speech provider and voice
    #[must_use]
    pub fn with_voice(mut self, provider: Option<String>, voice: impl Into<String>) -> Self {
        self.speech_provider = provider;
        self.voice = Some(voice.into());
        self
    }

    /// Whether a non-blank source image is present
    #[must_use]
    pub fn has_source_image(&self) -> bool {
        present(self.source_image_url.as_deref()).is_some()
    }

    /// Whether a non-blank source audio track is present
    #[must_use]
    pub fn has_source_audio(&self) -> bool {
        present(self.source_audio_url.as_deref()).is_some()
    }

    /// Build the video adapter input
    #[must_use]
    pub fn to_video_request(&self) -> VideoRequest {
        VideoRequest {
            prompt: self.prompt.clone(),
            image_url: present(self.source_image_url.as_deref()),
            image_end_url: present(self.source_image_end_url.as_deref()),
            audio_url: present(self.source_audio_url.as_deref()),
            duration: self.duration_hint,
            aspect_ratio: self.aspect_ratio.clone(),
        }
    }
}

/// A URL with surrounding whitespace removed, or `None` when blank
fn present(url: Option<&str>) -> Option<String> {
    url.map(str::trim).filter(|u| !u.is_empty()).map(str::to_string)
}

/// Image adapter input
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageRequest {
    /// Prompt text
    pub prompt: String,
    /// Aspect ratio such as `16:9`
    pub aspect_ratio: Option<String>,
    /// Style or character reference images
    pub reference_images: Vec<String>,
}

impl ImageRequest {
    /// Create an image request
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }
}

/// Video adapter input
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoRequest {
    /// Prompt text
    pub prompt: String,
    /// Start frame
    pub image_url: Option<String>,
    /// End frame
    pub image_end_url: Option<String>,
    /// Voice track
    pub audio_url: Option<String>,
    /// Requested duration in seconds
    pub duration: Option<u32>,
    /// Aspect ratio such as `16:9`
    pub aspect_ratio: Option<String>,
}

/// Speech adapter input
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    /// Text to speak
    pub text: String,
    /// Voice name or vendor voice id
    pub voice: String,
    /// Playback speed multiplier
    pub speed: Option<f32>,
}

/// Text adapter input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRequest {
    /// Prompt text
    pub prompt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_parsing() {
        assert_eq!("image".parse::<MediaKind>().unwrap(), MediaKind::Image);
        assert_eq!(" Video ".parse::<MediaKind>().unwrap(), MediaKind::Video);
        assert!(matches!(
            "hologram".parse::<MediaKind>(),
            Err(GatewayError::InvalidRequestKind { .. })
        ));
    }

    #[test]
    fn test_model_preference_parsing() {
        assert_eq!("".parse::<ModelPreference>().unwrap(), ModelPreference::Auto);
        assert_eq!("FAST".parse::<ModelPreference>().unwrap(), ModelPreference::Fast);
        assert_eq!(
            "luma".parse::<ModelPreference>().unwrap(),
            ModelPreference::Explicit(ExplicitVendor::Luma)
        );
        assert!("sora".parse::<ModelPreference>().is_err());
    }

    #[test]
    fn test_tags_are_normalised() {
        let req = GenerationRequest::new(MediaKind::Video, "a chase")
            .with_tags(["Action", " PHYSICS ", ""]);
        assert!(req.tags.contains("action"));
        assert!(req.tags.contains("physics"));
        assert_eq!(req.tags.len(), 2);
    }

    #[test]
    fn test_empty_urls_are_treated_as_absent() {
        let req = GenerationRequest::new(MediaKind::Video, "x")
            .with_source_image("")
            .with_source_audio("https://cdn/voice.mp3");
        assert!(!req.has_source_image());
        assert!(req.has_source_audio());
        assert_eq!(req.to_video_request().image_url, None);
    }

    #[test]
    fn test_blank_urls_are_treated_as_absent() {
        let req = GenerationRequest::new(MediaKind::Video, "x")
            .with_source_image(" \t ")
            .with_source_audio("  https://cdn/voice.mp3 ");
        assert!(!req.has_source_image());
        assert!(req.has_source_audio());

        let video = req.to_video_request();
        assert_eq!(video.image_url, None);
        assert_eq!(video.audio_url.as_deref(), Some("https://cdn/voice.mp3"));
    }
}
