//! # Studio Config
//!
//! Configuration management for the studio generation gateway.
//!
//! Configuration is read from an optional YAML or TOML file, overridden by
//! environment variables, and validated once at startup. Vendor API keys
//! are held as [`secrecy::SecretString`] and never logged.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod loader;

pub use config::{
    FalConfig, GeminiConfig, GenerationConfig, MediaConfig, PollingSettings, ProvidersConfig,
    RetrySettings, ServerConfig, StudioConfig, TelemetryConfig, VendorConfig,
    DEFAULT_ELEVENLABS_BASE_URL, DEFAULT_LUMA_BASE_URL, DEFAULT_OPENAI_BASE_URL,
};
pub use loader::{load_config, ConfigError, ConfigLoader};
