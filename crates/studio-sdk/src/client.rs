//! HTTP client for the studio gateway.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use studio_core::api::{
    ErrorBody, GenerateAudioBody, GenerateImageBody, GenerateVideoBody, JobResponse, MuxVideoBody,
    OrchestratorBody, TextBody, TextResponse, UrlResponse, VideoAction,
};
use studio_resilience::RetryPolicy;
use tracing::{debug, instrument};
use url::Url;

/// Client for the studio gateway.
///
/// # Example
///
/// ```rust,no_run
/// use studio_sdk::{Client, OrchestratorBody};
///
/// #[tokio::main]
/// async fn main() -> Result<(), studio_sdk::Error> {
///     let client = Client::builder().base_url("http://localhost:8080").build()?;
///
///     let result = client
///         .orchestrate(&OrchestratorBody {
///             kind: Some("video".into()),
///             prompt: Some("A rooftop chase at night".into()),
///             ..OrchestratorBody::default()
///         })
///         .await?;
///
///     println!("{}", result["url"]);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.config.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Bytes fetched through the media proxy.
#[derive(Debug, Clone)]
pub struct ProxiedMedia {
    /// Upstream content type.
    pub content_type: Option<String>,
    /// Body.
    pub bytes: Bytes,
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| Error::configuration(format!("Invalid user agent: {e}")))?,
        );

        for (name, value) in &config.custom_headers {
            let header_name = HeaderName::try_from(name.as_str())
                .map_err(|e| Error::configuration(format!("Invalid header name '{name}': {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| Error::configuration(format!("Invalid header value for '{name}': {e}")))?;
            headers.insert(header_name, header_value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Generate an image and return its URL.
    #[instrument(skip_all)]
    pub async fn generate_image(&self, body: &GenerateImageBody) -> Result<String> {
        let response: UrlResponse = self.post_json("/api/generate-image", body).await?;
        Ok(response.url)
    }

    /// Synthesize speech and return the `audio/mpeg` bytes.
    #[instrument(skip_all)]
    pub async fn generate_audio(&self, body: &GenerateAudioBody) -> Result<Bytes> {
        let url = self.url("/api/generate-audio")?;
        let response = self.send(|| self.http.post(url.clone()).json(body)).await?;
        let response = Self::check(response).await?;
        Ok(response.bytes().await?)
    }

    /// Submit a Luma generation; the vendor's JSON comes back untouched.
    #[instrument(skip_all)]
    pub async fn create_video(&self, body: &GenerateVideoBody) -> Result<Value> {
        let body = GenerateVideoBody {
            action: VideoAction::Create,
            ..body.clone()
        };
        self.post_json("/api/generate-video", &body).await
    }

    /// Fetch a Luma generation by id.
    #[instrument(skip(self))]
    pub async fn video_status(&self, generation_id: &str) -> Result<Value> {
        let body = GenerateVideoBody {
            action: VideoAction::Status,
            generation_id: Some(generation_id.to_string()),
            ..GenerateVideoBody::default()
        };
        self.post_json("/api/generate-video", &body).await
    }

    /// Call the orchestrator. The result shape depends on `type`.
    #[instrument(skip_all, fields(kind = ?body.kind))]
    pub async fn orchestrate(&self, body: &OrchestratorBody) -> Result<Value> {
        self.post_json("/api/orchestrator", body).await
    }

    /// Single status check of an orchestrated video job.
    #[instrument(skip(self))]
    pub async fn job_status(&self, request_id: &str, model: &str) -> Result<JobResponse> {
        let body = OrchestratorBody {
            kind: Some("status".to_string()),
            request_id: Some(request_id.to_string()),
            model: Some(model.to_string()),
            ..OrchestratorBody::default()
        };
        self.post_json("/api/orchestrator", &body).await
    }

    /// Mux dialogue and music into a video. Returns either the original
    /// URL or a `data:video/mp4;base64,` URL.
    #[instrument(skip_all)]
    pub async fn mux_video(&self, body: &MuxVideoBody) -> Result<String> {
        let response: UrlResponse = self.post_json("/api/mux-video", body).await?;
        Ok(response.url)
    }

    /// Generate text.
    #[instrument(skip_all)]
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let body = TextBody {
            prompt: Some(prompt.to_string()),
        };
        let response: TextResponse = self.post_json("/api/gemini", &body).await?;
        Ok(response.result)
    }

    /// Fetch a remote asset through the gateway's media proxy.
    #[instrument(skip(self))]
    pub async fn proxy(&self, target: &str) -> Result<ProxiedMedia> {
        let mut url = self.url("/api/proxy-image")?;
        url.query_pairs_mut().append_pair("url", target);

        let response = self.send(|| self.http.get(url.clone())).await?;
        let response = Self::check(response).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(ProxiedMedia {
            content_type,
            bytes: response.bytes().await?,
        })
    }

    /// Check that the gateway is up.
    pub async fn is_healthy(&self) -> bool {
        let Ok(url) = self.url("/health") else {
            return false;
        };
        self.http
            .get(url)
            .send()
            .await
            .is_ok_and(|r| r.status().is_success())
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        debug!(%url, "Sending request");

        let response = self.send(|| self.http.post(url.clone()).json(body)).await?;
        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| Error::parse_error(format!("Failed to parse response: {e}")))
    }

    /// Send a request, backing off exponentially while the gateway answers 429.
    async fn send<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let policy = RetryPolicy::exponential(
            self.config.max_retries.saturating_add(1),
            self.config.retry_initial_delay,
        );
        let attempts = AtomicU32::new(0);
        let (build, attempts) = (&build, &attempts);

        policy
            .execute_if(
                || async move {
                    let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
                    let response = build().send().await?;
                    if response.status() == StatusCode::TOO_MANY_REQUESTS {
                        debug!(attempt, "Gateway rate limited the request");
                        return Err(Error::RateLimited {
                            attempts: attempt,
                            request_id: request_id(&response),
                        });
                    }
                    Ok(response)
                },
                Error::is_rate_limited,
            )
            .await
    }

    /// Turn a non-2xx response into an [`Error::Api`].
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let request_id = request_id(&response);
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| {
                if body.is_empty() {
                    format!("HTTP {}", status.as_u16())
                } else {
                    body
                }
            });

        Err(Error::Api {
            status: status.as_u16(),
            message,
            request_id,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.config
            .base_url
            .join(path)
            .map_err(|e| Error::configuration(format!("Invalid URL path '{path}': {e}")))
    }
}

fn request_id(response: &Response) -> Option<String> {
    response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Builder for creating a Client.
#[derive(Debug, Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_initial_delay: Option<Duration>,
    user_agent: Option<String>,
    custom_headers: Vec<(String, String)>,
}

impl ClientBuilder {
    /// Create a new client builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the number of retries after a 429.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set the delay before the first retry.
    pub fn retry_initial_delay(mut self, delay: Duration) -> Self {
        self.retry_initial_delay = Some(delay);
        self
    }

    /// Set the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        let raw = self.base_url.as_deref().unwrap_or("http://localhost:8080");
        let base_url =
            Url::parse(raw).map_err(|e| Error::configuration(format!("Invalid base URL '{raw}': {e}")))?;

        let config = ClientConfig {
            base_url,
            timeout: self.timeout.unwrap_or(ClientConfig::DEFAULT_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(ClientConfig::DEFAULT_CONNECT_TIMEOUT),
            max_retries: self.max_retries.unwrap_or(ClientConfig::DEFAULT_MAX_RETRIES),
            retry_initial_delay: self
                .retry_initial_delay
                .unwrap_or(ClientConfig::DEFAULT_RETRY_INITIAL_DELAY),
            user_agent: self
                .user_agent
                .unwrap_or_else(|| ClientConfig::DEFAULT_USER_AGENT.to_string()),
            custom_headers: self.custom_headers,
        };

        Client::new(config)
    }
}
