//! Configuration loading from files and the environment.

use crate::config::StudioConfig;
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use studio_core::GatewayError;
use thiserror::Error;
use tracing::{debug, info, warn};
use validator::Validate;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File contents did not parse
    #[error("Failed to parse config file {path}: {message}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Extension is not yaml, yml or toml
    #[error("Unsupported config format: {path}")]
    UnsupportedFormat {
        /// File path
        path: PathBuf,
    },

    /// An environment override had an unusable value
    #[error("Invalid value for {var}: {value}")]
    InvalidEnv {
        /// Variable name
        var: String,
        /// Raw value
        value: String,
    },

    /// Validation failed
    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl From<ConfigError> for GatewayError {
    fn from(err: ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Builds a [`StudioConfig`] from an optional file plus environment overrides
pub struct ConfigLoader {
    file: Option<PathBuf>,
    lookup: EnvLookup,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

impl ConfigLoader {
    /// Loader reading the process environment
    #[must_use]
    pub fn new() -> Self {
        Self {
            file: None,
            lookup: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Read this file before applying the environment
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Replace the environment lookup
    #[must_use]
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.lookup = Box::new(lookup);
        self
    }

    /// Load, override and validate
    pub async fn load(&self) -> Result<StudioConfig, ConfigError> {
        let mut config = match &self.file {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration file");
                Self::read_file(path).await?
            }
            None => StudioConfig::default(),
        };

        self.apply_env(&mut config)?;
        config.validate()?;

        for vendor in config.missing_credentials() {
            warn!(vendor = %vendor, "No API key configured; requests to this vendor will fail");
        }

        Ok(config)
    }

    async fn read_file(path: &Path) -> Result<StudioConfig, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let parse_err = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&contents).map_err(|e| parse_err(e.to_string()))
            }
            Some("toml") => toml::from_str(&contents).map_err(|e| parse_err(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn var(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    fn apply_env(&self, config: &mut StudioConfig) -> Result<(), ConfigError> {
        if let Some(host) = self.var("STUDIO_HOST") {
            config.server.host = host;
        }
        if let Some(port) = self.var("STUDIO_PORT") {
            config.server.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "STUDIO_PORT".to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(level) = self.var("STUDIO_LOG_LEVEL") {
            config.telemetry.log_level = level;
        }
        if let Some(json) = self.var("STUDIO_LOG_JSON") {
            config.telemetry.json_logs = matches!(json.as_str(), "1" | "true" | "yes");
        }
        if let Some(path) = self.var("STUDIO_FFMPEG_PATH") {
            config.media.ffmpeg_path = path;
        }

        let providers = &mut config.providers;
        let keys: [(&str, &mut Option<SecretString>); 5] = [
            ("GEMINI_API_KEY", &mut providers.gemini.api_key),
            ("FAL_KEY", &mut providers.fal.api_key),
            ("LUMA_API_KEY", &mut providers.luma.api_key),
            ("OPENAI_API_KEY", &mut providers.openai.api_key),
            ("ELEVENLABS_API_KEY", &mut providers.elevenlabs.api_key),
        ];
        for (name, slot) in keys {
            if let Some(key) = self.var(name) {
                debug!(var = name, "API key taken from environment");
                *slot = Some(SecretString::new(key));
            }
        }

        Ok(())
    }
}

/// Load configuration from `path` (if any) and the process environment
pub async fn load_config(path: Option<&Path>) -> Result<StudioConfig, ConfigError> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = path {
        loader = loader.with_file(path);
    }
    loader.load().await
}
