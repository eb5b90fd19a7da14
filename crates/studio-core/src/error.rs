//! Error types for the gateway.
//!
//! Every failure in the generation pipeline is one of these variants. The
//! server boundary converts them into `{error}` JSON bodies; nothing here
//! carries a credential.

use std::time::Duration;
use thiserror::Error;

/// Result alias used throughout the workspace
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway error taxonomy
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No API key configured for a vendor
    #[error("Missing credential: {vendor} API key is not configured")]
    MissingCredential {
        /// Vendor whose key is missing
        vendor: String,
    },

    /// A required request field is missing or malformed
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Human readable description
        message: String,
        /// Offending field, if known
        field: Option<String>,
    },

    /// Unknown generation kind
    #[error("Invalid request kind: {kind}")]
    InvalidRequestKind {
        /// The kind that was supplied
        kind: String,
    },

    /// Vendor returned a non-2xx response other than 429
    #[error("{vendor} returned HTTP {status}: {message}")]
    Upstream {
        /// Vendor name
        vendor: String,
        /// HTTP status code returned by the vendor
        status: u16,
        /// Vendor error message or raw body
        message: String,
    },

    /// Vendor signalled a rate limit (HTTP 429)
    #[error("{vendor} rate limit exceeded")]
    RateLimited {
        /// Vendor name
        vendor: String,
        /// Retry-After hint, if the vendor sent one
        retry_after: Option<Duration>,
    },

    /// Transport-level failure talking to a vendor
    #[error("Network error calling {vendor}: {message}")]
    Network {
        /// Vendor name
        vendor: String,
        /// Transport error description
        message: String,
    },

    /// Vendor response did not match the expected schema
    #[error("Unexpected response shape from {vendor}: {message}")]
    InvalidUpstreamShape {
        /// Vendor name
        vendor: String,
        /// What was wrong with the payload
        message: String,
    },

    /// Vendor reported the asynchronous job as failed
    #[error("Generation {request_id} failed: {message}")]
    GenerationFailed {
        /// Vendor-assigned job id
        request_id: String,
        /// Vendor-provided failure reason
        message: String,
    },

    /// Poller exhausted its iteration budget
    #[error("Generation {request_id} timed out after {attempts} status checks")]
    GenerationTimeout {
        /// Vendor-assigned job id
        request_id: String,
        /// Number of status checks performed
        attempts: u32,
    },

    /// Media post-processing failed
    #[error("Mux failed: {message}")]
    Mux {
        /// Failure description
        message: String,
    },

    /// Configuration is invalid
    #[error("Configuration error: {message}")]
    Configuration {
        /// Failure description
        message: String,
    },

    /// Anything else
    #[error("Internal error: {message}")]
    Internal {
        /// Failure description
        message: String,
    },
}

impl GatewayError {
    /// Create a missing credential error
    pub fn missing_credential(vendor: impl Into<String>) -> Self {
        Self::MissingCredential {
            vendor: vendor.into(),
        }
    }

    /// Create an invalid request error for a specific field
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            field: None,
        }
    }

    /// Create an error for a missing required field
    pub fn missing_field(field: &str) -> Self {
        Self::invalid_field(field, format!("Missing required parameter: {field}"))
    }

    /// Create an upstream error
    pub fn upstream(vendor: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            vendor: vendor.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a rate limit error
    pub fn rate_limited(vendor: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::RateLimited {
            vendor: vendor.into(),
            retry_after,
        }
    }

    /// Create a network error
    pub fn network(vendor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            vendor: vendor.into(),
            message: message.into(),
        }
    }

    /// Create a shape error
    pub fn invalid_shape(vendor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUpstreamShape {
            vendor: vendor.into(),
            message: message.into(),
        }
    }

    /// Create a mux error
    pub fn mux(message: impl Into<String>) -> Self {
        Self::Mux {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether a repeat of the same call may succeed.
    ///
    /// Only vendor 5xx responses and transport failures qualify. Every 4xx,
    /// including 429, is a problem the caller has to fix or wait out.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Upstream { status, .. } => (500..=599).contains(status),
            Self::Network { .. } => true,
            _ => false,
        }
    }

    /// HTTP status the server should answer with
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. } | Self::InvalidRequestKind { .. } => 400,
            Self::MissingCredential { .. } => 401,
            Self::RateLimited { .. } => 429,
            _ => 500,
        }
    }

    /// Vendor status code carried by the error, if any
    #[must_use]
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Short machine-readable error type
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::MissingCredential { .. } => "missing_credential",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::InvalidRequestKind { .. } => "invalid_request_kind",
            Self::Upstream { .. } => "upstream_error",
            Self::RateLimited { .. } => "rate_limited",
            Self::Network { .. } => "network_error",
            Self::InvalidUpstreamShape { .. } => "invalid_upstream_shape",
            Self::GenerationFailed { .. } => "generation_failed",
            Self::GenerationTimeout { .. } => "generation_timeout",
            Self::Mux { .. } => "mux_error",
            Self::Configuration { .. } => "configuration_error",
            Self::Internal { .. } => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(GatewayError::upstream("fal", 503, "unavailable").is_transient());
        assert!(GatewayError::upstream("fal", 500, "boom").is_transient());
        assert!(GatewayError::network("fal", "connection reset").is_transient());

        assert!(!GatewayError::upstream("fal", 400, "bad prompt").is_transient());
        assert!(!GatewayError::upstream("fal", 402, "billing").is_transient());
        assert!(!GatewayError::rate_limited("fal", None).is_transient());
        assert!(!GatewayError::missing_credential("fal").is_transient());
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(GatewayError::missing_field("prompt").http_status(), 400);
        assert_eq!(
            GatewayError::InvalidRequestKind {
                kind: "hologram".into()
            }
            .http_status(),
            400
        );
        assert_eq!(GatewayError::missing_credential("luma").http_status(), 401);
        assert_eq!(GatewayError::rate_limited("gemini", None).http_status(), 429);
        assert_eq!(GatewayError::upstream("luma", 404, "gone").http_status(), 500);
        assert_eq!(GatewayError::mux("ffmpeg exited 1").http_status(), 500);
    }

    #[test]
    fn test_missing_credential_message_names_vendor_only() {
        let err = GatewayError::missing_credential("elevenlabs");
        let msg = err.to_string();
        assert!(msg.contains("elevenlabs"));
        assert!(msg.contains("not configured"));
    }
}
