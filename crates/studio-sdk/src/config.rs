//! Client configuration.

use std::time::Duration;
use url::Url;

/// Configuration for the SDK client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the gateway.
    pub(crate) base_url: Url,
    /// Request timeout. Orchestrated video requests block until the job
    /// finishes, so this is generous.
    pub(crate) timeout: Duration,
    /// Connection timeout.
    pub(crate) connect_timeout: Duration,
    /// Retries after a 429, the first attempt excluded.
    pub(crate) max_retries: u32,
    /// Delay before the first retry; doubles each time.
    pub(crate) retry_initial_delay: Duration,
    /// User agent string.
    pub(crate) user_agent: String,
    /// Headers added to every request.
    pub(crate) custom_headers: Vec<(String, String)>,
}

impl ClientConfig {
    /// Default request timeout (20 minutes).
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1200);
    /// Default connection timeout (10 seconds).
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default rate-limit retries.
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    /// Default initial retry delay (1 second).
    pub const DEFAULT_RETRY_INITIAL_DELAY: Duration = Duration::from_secs(1);
    /// Default user agent.
    pub const DEFAULT_USER_AGENT: &'static str = concat!("studio-sdk-rust/", env!("CARGO_PKG_VERSION"));

    /// Create a configuration with default values.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Self::DEFAULT_TIMEOUT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            retry_initial_delay: Self::DEFAULT_RETRY_INITIAL_DELAY,
            user_agent: Self::DEFAULT_USER_AGENT.to_string(),
            custom_headers: Vec::new(),
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the rate-limit retry count.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Get the initial retry delay.
    pub fn retry_initial_delay(&self) -> Duration {
        self.retry_initial_delay
    }

    /// Get the user agent.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Get custom headers.
    pub fn custom_headers(&self) -> &[(String, String)] {
        &self.custom_headers
    }
}
