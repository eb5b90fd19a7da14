//! OpenAI speech adapter (`POST /audio/speech`).

use crate::http;
use crate::payload::VendorRequest;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use studio_config::{VendorConfig, DEFAULT_OPENAI_BASE_URL};
use studio_core::{GatewayError, GatewayResult, SpeechModel, SpeechRequest, SpeechSynthesizer, Vendor};
use tracing::debug;

/// OpenAI text-to-speech
pub struct OpenAiSpeech {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiSpeech {
    /// Create a synthesizer
    ///
    /// # Errors
    /// Returns `MissingCredential` without an API key
    pub fn new(config: &VendorConfig) -> GatewayResult<Self> {
        Ok(Self {
            client: http::build_client()?,
            api_key: http::require_key(Vendor::OpenAi, config.api_key.as_ref())?,
            base_url: config
                .base_url_or(DEFAULT_OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    fn vendor(&self) -> Vendor {
        Vendor::OpenAi
    }

    async fn synthesize(&self, model: SpeechModel, request: &SpeechRequest) -> GatewayResult<Bytes> {
        if model.vendor() != Vendor::OpenAi {
            return Err(GatewayError::internal(format!(
                "{} is not served by OpenAI",
                model.model_id()
            )));
        }

        debug!(vendor = "openai", model = model.model_id(), voice = %request.voice, "Synthesizing speech");

        let response = http::send(
            Vendor::OpenAi,
            self.client
                .post(format!("{}/audio/speech", self.base_url))
                .bearer_auth(self.api_key.expose_secret())
                .json(&VendorRequest::speech(model, request)),
        )
        .await?;

        response
            .bytes()
            .await
            .map_err(|e| GatewayError::network("openai", format!("Failed to read audio: {}", e.without_url())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_synthesize_returns_audio_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/speech"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_json(json!({
                "model": "tts-1",
                "input": "INT. KITCHEN - NIGHT",
                "voice": "nova",
                "speed": 1.5,
                "response_format": "mp3"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "audio/mpeg")
                    .set_body_bytes(b"ID3mp3data".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let speech = OpenAiSpeech::new(
            &VendorConfig::default()
                .with_api_key("sk-test")
                .with_base_url(server.uri()),
        )
        .unwrap();
        let audio = speech
            .synthesize(
                SpeechModel::OpenAiTts1,
                &SpeechRequest {
                    text: "INT. KITCHEN - NIGHT".into(),
                    voice: "nova".into(),
                    speed: Some(1.5),
                },
            )
            .await
            .unwrap();
        assert_eq!(&audio[..], b"ID3mp3data");
    }

    #[tokio::test]
    async fn test_bad_voice_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": {"message": "Invalid voice 'bob'"}})),
            )
            .mount(&server)
            .await;

        let speech = OpenAiSpeech::new(
            &VendorConfig::default()
                .with_api_key("sk-test")
                .with_base_url(server.uri()),
        )
        .unwrap();
        let err = speech
            .synthesize(
                SpeechModel::OpenAiTts1,
                &SpeechRequest {
                    text: "hi".into(),
                    voice: "bob".into(),
                    speed: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.upstream_status(), Some(400));
        assert!(err.to_string().contains("Invalid voice 'bob'"));
        assert!(!err.to_string().contains("sk-test"));
    }
}
