//! Provider registry.
//!
//! Holds one adapter per configured vendor. A vendor without an API key is
//! simply absent; asking for it yields `MissingCredential` at request time
//! rather than failing startup.

use crate::elevenlabs::ElevenLabsSpeech;
use crate::fal::FalProvider;
use crate::gemini::GeminiProvider;
use crate::luma::LumaProvider;
use crate::openai::OpenAiSpeech;
use std::collections::HashMap;
use std::sync::Arc;
use studio_config::ProvidersConfig;
use studio_core::{
    GatewayError, GatewayResult, ImageGenerator, SpeechModel, SpeechSynthesizer, TextGenerator,
    Vendor, VideoGenerator, VideoModel,
};
use tracing::{info, warn};

/// Registry of vendor adapters
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    image: Option<Arc<dyn ImageGenerator>>,
    video: HashMap<Vendor, Arc<dyn VideoGenerator>>,
    speech: HashMap<Vendor, Arc<dyn SpeechSynthesizer>>,
    text: Option<Arc<dyn TextGenerator>>,
    luma: Option<Arc<LumaProvider>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("vendors", &self.configured_vendors())
            .finish()
    }
}

/// `Ok(None)` for a missing key, the adapter otherwise
fn optional<T>(vendor: Vendor, built: GatewayResult<T>) -> GatewayResult<Option<T>> {
    match built {
        Ok(adapter) => Ok(Some(adapter)),
        Err(GatewayError::MissingCredential { .. }) => {
            warn!(vendor = %vendor, "Vendor API key not configured");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

impl ProviderRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build adapters for every vendor that has a key
    pub fn from_config(config: &ProvidersConfig) -> GatewayResult<Self> {
        let mut registry = Self::new();

        if let Some(fal) = optional(Vendor::Fal, FalProvider::new(&config.fal))? {
            let fal = Arc::new(fal);
            registry = registry
                .with_image_generator(fal.clone())
                .with_video_generator(fal);
        }
        if let Some(luma) = optional(Vendor::Luma, LumaProvider::new(&config.luma))? {
            registry = registry.with_luma(Arc::new(luma));
        }
        if let Some(openai) = optional(Vendor::OpenAi, OpenAiSpeech::new(&config.openai))? {
            registry = registry.with_speech_synthesizer(Arc::new(openai));
        }
        if let Some(eleven) = optional(Vendor::ElevenLabs, ElevenLabsSpeech::new(&config.elevenlabs))? {
            registry = registry.with_speech_synthesizer(Arc::new(eleven));
        }
        if let Some(gemini) = optional(Vendor::Gemini, GeminiProvider::new(&config.gemini))? {
            registry = registry.with_text_generator(Arc::new(gemini));
        }

        info!(vendors = ?registry.configured_vendors(), "Provider registry initialized");
        Ok(registry)
    }

    /// Register the image generator
    #[must_use]
    pub fn with_image_generator(mut self, generator: Arc<dyn ImageGenerator>) -> Self {
        self.image = Some(generator);
        self
    }

    /// Register a video generator under its vendor
    #[must_use]
    pub fn with_video_generator(mut self, generator: Arc<dyn VideoGenerator>) -> Self {
        self.video.insert(generator.vendor(), generator);
        self
    }

    /// Register a speech synthesizer under its vendor
    #[must_use]
    pub fn with_speech_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.speech.insert(synthesizer.vendor(), synthesizer);
        self
    }

    /// Register the text generator
    #[must_use]
    pub fn with_text_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.text = Some(generator);
        self
    }

    /// Register Luma, both as a video generator and for raw passthrough
    #[must_use]
    pub fn with_luma(mut self, luma: Arc<LumaProvider>) -> Self {
        self.video.insert(Vendor::Luma, luma.clone());
        self.luma = Some(luma);
        self
    }

    /// Image generator
    pub fn image(&self) -> GatewayResult<Arc<dyn ImageGenerator>> {
        self.image
            .clone()
            .ok_or_else(|| GatewayError::missing_credential(Vendor::Fal.as_str()))
    }

    /// Video generator serving `model`
    pub fn video(&self, model: VideoModel) -> GatewayResult<Arc<dyn VideoGenerator>> {
        let vendor = model.vendor();
        self.video
            .get(&vendor)
            .cloned()
            .ok_or_else(|| GatewayError::missing_credential(vendor.as_str()))
    }

    /// Speech synthesizer serving `model`
    pub fn speech(&self, model: SpeechModel) -> GatewayResult<Arc<dyn SpeechSynthesizer>> {
        let vendor = model.vendor();
        self.speech
            .get(&vendor)
            .cloned()
            .ok_or_else(|| GatewayError::missing_credential(vendor.as_str()))
    }

    /// Text generator
    pub fn text(&self) -> GatewayResult<Arc<dyn TextGenerator>> {
        self.text
            .clone()
            .ok_or_else(|| GatewayError::missing_credential(Vendor::Gemini.as_str()))
    }

    /// Luma adapter for raw JSON passthrough
    pub fn luma(&self) -> GatewayResult<Arc<LumaProvider>> {
        self.luma
            .clone()
            .ok_or_else(|| GatewayError::missing_credential(Vendor::Luma.as_str()))
    }

    /// Vendors with at least one adapter, in a stable order
    #[must_use]
    pub fn configured_vendors(&self) -> Vec<Vendor> {
        [
            Vendor::Fal,
            Vendor::Luma,
            Vendor::OpenAi,
            Vendor::ElevenLabs,
            Vendor::Gemini,
        ]
        .into_iter()
        .filter(|vendor| {
            self.video.contains_key(vendor)
                || self.speech.contains_key(vendor)
                || (*vendor == Vendor::Fal && self.image.is_some())
                || (*vendor == Vendor::Gemini && self.text.is_some())
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_config::VendorConfig;

    #[test]
    fn test_empty_config_reports_missing_credentials() {
        let registry = ProviderRegistry::from_config(&ProvidersConfig::default()).unwrap();
        assert!(registry.configured_vendors().is_empty());

        let err = registry.video(VideoModel::KlingText).err().unwrap();
        assert!(matches!(err, GatewayError::MissingCredential { ref vendor } if vendor == "fal"));
        assert_eq!(err.http_status(), 401);

        let err = registry.speech(SpeechModel::ElevenMultilingualV2).err().unwrap();
        assert!(matches!(err, GatewayError::MissingCredential { ref vendor } if vendor == "elevenlabs"));

        assert!(registry.text().is_err());
        assert!(registry.luma().is_err());
        assert!(registry.image().is_err());
    }

    #[test]
    fn test_partial_config() {
        let config = ProvidersConfig {
            luma: VendorConfig::default().with_api_key("luma-key"),
            openai: VendorConfig::default().with_api_key("sk-key"),
            ..ProvidersConfig::default()
        };
        let registry = ProviderRegistry::from_config(&config).unwrap();

        assert_eq!(registry.configured_vendors(), vec![Vendor::Luma, Vendor::OpenAi]);
        assert!(registry.video(VideoModel::LumaFlashText).is_ok());
        assert!(registry.video(VideoModel::MinimaxText).is_err());
        assert!(registry.speech(SpeechModel::OpenAiTts1).is_ok());
        assert!(registry.luma().is_ok());
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = ProvidersConfig {
            openai: VendorConfig::default().with_api_key("   "),
            ..ProvidersConfig::default()
        };
        let registry = ProviderRegistry::from_config(&config).unwrap();
        assert!(registry.speech(SpeechModel::OpenAiTts1).is_err());
    }
}
