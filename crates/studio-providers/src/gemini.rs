//! Gemini text adapter.
//!
//! `POST {base}/models/{model}:generateContent?key=...`. The key travels as
//! a query parameter, so request URLs are never logged.

use crate::http;
use crate::payload::VendorRequest;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use studio_config::GeminiConfig;
use studio_core::{GatewayError, GatewayResult, TextGenerator, TextRequest, Vendor};
use tracing::debug;

/// Gemini text generation
pub struct GeminiProvider {
    client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    /// Create a provider
    ///
    /// # Errors
    /// Returns `MissingCredential` without an API key
    pub fn new(config: &GeminiConfig) -> GatewayResult<Self> {
        Ok(Self {
            client: http::build_client()?,
            api_key: http::require_key(Vendor::Gemini, config.api_key.as_ref())?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    fn vendor(&self) -> Vendor {
        Vendor::Gemini
    }

    async fn generate_text(&self, request: &TextRequest) -> GatewayResult<String> {
        debug!(vendor = "gemini", model = %self.model, "Sending text generation request");

        let response = http::send(
            Vendor::Gemini,
            self.client
                .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
                .query(&[("key", self.api_key.expose_secret().as_str())])
                .json(&VendorRequest::text(&request.prompt)),
        )
        .await?;

        let body: GeminiResponse = http::read_json(Vendor::Gemini, response).await?;
        let text: String = body
            .candidates
            .into_iter()
            .take(1)
            .flat_map(|c| c.content.parts)
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(GatewayError::invalid_shape("gemini", "response contained no text"));
        }
        Ok(text)
    }
}

// Gemini API types

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiCandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> GeminiProvider {
        GeminiProvider::new(&GeminiConfig {
            api_key: Some(SecretString::new("g-test".to_string())),
            base_url: server.uri(),
            model: "gemini-2.0-flash".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_text_concatenates_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(query_param("key", "g-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "FADE IN: "}, {"text": "A quiet street."}]},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider(&server)
            .generate_text(&TextRequest {
                prompt: "Open the scene".into(),
            })
            .await
            .unwrap();
        assert_eq!(text, "FADE IN: A quiet street.");
    }

    #[tokio::test]
    async fn test_empty_candidates_is_shape_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate_text(&TextRequest { prompt: "x".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidUpstreamShape { .. }));
    }

    #[tokio::test]
    async fn test_google_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate_text(&TextRequest { prompt: "x".into() })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("API key not valid"));
    }
}
