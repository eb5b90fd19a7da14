//! ElevenLabs speech adapter (`POST /text-to-speech/{voice_id}`, `xi-api-key`).

use crate::http;
use crate::payload::VendorRequest;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use studio_config::{VendorConfig, DEFAULT_ELEVENLABS_BASE_URL};
use studio_core::{GatewayError, GatewayResult, SpeechModel, SpeechRequest, SpeechSynthesizer, Vendor};
use tracing::debug;

/// ElevenLabs text-to-speech
pub struct ElevenLabsSpeech {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

impl ElevenLabsSpeech {
    /// Create a synthesizer
    ///
    /// # Errors
    /// Returns `MissingCredential` without an API key
    pub fn new(config: &VendorConfig) -> GatewayResult<Self> {
        Ok(Self {
            client: http::build_client()?,
            api_key: http::require_key(Vendor::ElevenLabs, config.api_key.as_ref())?,
            base_url: config
                .base_url_or(DEFAULT_ELEVENLABS_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSpeech {
    fn vendor(&self) -> Vendor {
        Vendor::ElevenLabs
    }

    async fn synthesize(&self, model: SpeechModel, request: &SpeechRequest) -> GatewayResult<Bytes> {
        if model.vendor() != Vendor::ElevenLabs {
            return Err(GatewayError::internal(format!(
                "{} is not served by ElevenLabs",
                model.model_id()
            )));
        }
        let voice_id = http::path_segment("ElevenLabs voice id", &request.voice)
            .map_err(|_| GatewayError::invalid_field("voice", "Invalid ElevenLabs voice id"))?;

        debug!(vendor = "elevenlabs", voice_id = voice_id, "Synthesizing speech");

        let response = http::send(
            Vendor::ElevenLabs,
            self.client
                .post(format!("{}/text-to-speech/{}", self.base_url, voice_id))
                .header("xi-api-key", self.api_key.expose_secret())
                .header("Accept", "audio/mpeg")
                .json(&VendorRequest::speech(model, request)),
        )
        .await?;

        response
            .bytes()
            .await
            .map_err(|e| GatewayError::network("elevenlabs", format!("Failed to read audio: {}", e.without_url())))
    }
}
