//! Configuration types.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use studio_core::Vendor;
use validator::{Validate, ValidationError};

/// Root configuration, validated once at startup and shared read-only
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct StudioConfig {
    /// HTTP listener
    #[validate(nested)]
    pub server: ServerConfig,
    /// Vendor credentials and endpoints
    #[validate(nested)]
    pub providers: ProvidersConfig,
    /// Retry and polling
    #[validate(nested)]
    pub generation: GenerationConfig,
    /// Media post-processing
    #[validate(nested)]
    pub media: MediaConfig,
    /// Logging and tracing
    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

impl StudioConfig {
    /// Vendors without an API key
    #[must_use]
    pub fn missing_credentials(&self) -> Vec<Vendor> {
        let p = &self.providers;
        [
            (Vendor::Gemini, p.gemini.api_key.is_some()),
            (Vendor::Fal, p.fal.api_key.is_some()),
            (Vendor::Luma, p.luma.api_key.is_some()),
            (Vendor::OpenAi, p.openai.api_key.is_some()),
            (Vendor::ElevenLabs, p.elevenlabs.api_key.is_some()),
        ]
        .into_iter()
        .filter_map(|(vendor, present)| (!present).then_some(vendor))
        .collect()
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host
    #[validate(length(min = 1))]
    pub host: String,
    /// Bind port
    #[validate(range(min = 1))]
    pub port: u16,
    /// How long to wait for in-flight requests on shutdown
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    /// Socket address to bind
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Default Luma Dream Machine API base
pub const DEFAULT_LUMA_BASE_URL: &str = "https://api.lumalabs.ai/dream-machine/v1";
/// Default OpenAI API base
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default ElevenLabs API base
pub const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io/v1";

/// A vendor with one API base URL
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct VendorConfig {
    /// API key
    pub api_key: Option<SecretString>,
    /// API base URL override
    #[validate(url)]
    pub base_url: Option<String>,
}

impl VendorConfig {
    /// Set the API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(key.into()));
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Configured base URL or the vendor default
    #[must_use]
    pub fn base_url_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.base_url.as_deref().unwrap_or(default)
    }

    /// Whether a non-empty key is configured
    #[must_use]
    pub fn has_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }
}

/// fal.ai has separate synchronous and queue hosts
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct FalConfig {
    /// API key
    pub api_key: Option<SecretString>,
    /// Synchronous endpoint base
    #[validate(url)]
    pub sync_base_url: String,
    /// Queue endpoint base
    #[validate(url)]
    pub queue_base_url: String,
}

impl Default for FalConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            sync_base_url: "https://fal.run".to_string(),
            queue_base_url: "https://queue.fal.run".to_string(),
        }
    }
}

/// Gemini text generation
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key
    pub api_key: Option<SecretString>,
    /// API base URL
    #[validate(url)]
    pub base_url: String,
    /// Model name
    #[validate(length(min = 1))]
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
        }
    }
}

/// All vendors
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Gemini (text)
    #[validate(nested)]
    pub gemini: GeminiConfig,
    /// fal.ai (image, Kling, MiniMax)
    #[validate(nested)]
    pub fal: FalConfig,
    /// Luma Dream Machine (video)
    #[validate(nested)]
    pub luma: VendorConfig,
    /// OpenAI (speech)
    #[validate(nested)]
    pub openai: VendorConfig,
    /// ElevenLabs (speech)
    #[validate(nested)]
    pub elevenlabs: VendorConfig,
}

fn validate_positive_duration(d: &Duration) -> Result<(), ValidationError> {
    if d.is_zero() {
        return Err(ValidationError::new("zero_duration"));
    }
    Ok(())
}

/// Image retry settings
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts, first call included
    #[validate(range(min = 1, max = 10))]
    pub max_attempts: u32,
    /// Delay unit; attempt `n` waits `base_delay * n`
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Video status polling settings
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct PollingSettings {
    /// Time between status checks
    #[serde(with = "humantime_serde")]
    #[validate(custom(function = "validate_positive_duration"))]
    pub interval: Duration,
    /// Status checks before giving up
    #[validate(range(min = 1))]
    pub max_iterations: u32,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_iterations: 60,
        }
    }
}

/// Generation behaviour
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct GenerationConfig {
    /// Image retry policy
    #[validate(nested)]
    pub image_retry: RetrySettings,
    /// Video polling
    #[validate(nested)]
    pub polling: PollingSettings,
}

/// Media post-processing
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct MediaConfig {
    /// Media binary to invoke
    #[validate(length(min = 1))]
    pub ffmpeg_path: String,
    /// Parent of the per-operation scratch directories; system temp when unset
    pub scratch_dir: Option<PathBuf>,
    /// Common sample rate for audio inputs
    #[validate(range(min = 8000, max = 192_000))]
    pub sample_rate: u32,
    /// Background music gain when mixed under dialogue
    #[validate(range(min = 0.0, max = 1.0))]
    pub bgm_volume: f32,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            scratch_dir: None,
            sample_rate: 44_100,
            bgm_volume: 0.25,
        }
    }
}

impl MediaConfig {
    /// Resolved scratch parent directory
    #[must_use]
    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Logging and tracing
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Default log filter, overridden by `RUST_LOG`
    #[validate(length(min = 1))]
    pub log_level: String,
    /// Emit JSON log lines
    pub json_logs: bool,
    /// Install the OpenTelemetry layer
    pub tracing_enabled: bool,
    /// Service name reported in spans
    #[validate(length(min = 1))]
    pub service_name: String,
    /// Deployment environment
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            tracing_enabled: false,
            service_name: "studio-gateway".to_string(),
            environment: "development".to_string(),
        }
    }
}
