//! Shared HTTP plumbing for the vendor adapters.
//!
//! Every adapter funnels its calls through [`send`] so that transport
//! failures, rate limits and non-2xx responses map to the same
//! [`GatewayError`] variants regardless of vendor.

use reqwest::{header::RETRY_AFTER, Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use studio_core::{GatewayError, GatewayResult, Vendor};
use tracing::{error, trace, warn};

/// Build the pooled client used by one adapter
///
/// No request timeout is set: a slow vendor call is bounded only by the
/// caller, and video jobs by the poll budget.
pub fn build_client() -> GatewayResult<Client> {
    Client::builder()
        .pool_max_idle_per_host(32)
        .build()
        .map_err(|e| GatewayError::internal(format!("Failed to create HTTP client: {e}")))
}

/// The configured key, or `MissingCredential` when absent or empty
pub fn require_key(vendor: Vendor, key: Option<&SecretString>) -> GatewayResult<SecretString> {
    key.filter(|k| !k.expose_secret().trim().is_empty())
        .cloned()
        .ok_or_else(|| GatewayError::missing_credential(vendor.as_str()))
}

/// A client-supplied id that is safe to place in a single URL path segment
///
/// Rejects anything that could change the request path or query
/// (`/`, `\`, `?`, `#`, `%`, `..`, whitespace and control characters).
pub fn path_segment<'a>(what: &str, id: &'a str) -> GatewayResult<&'a str> {
    let id = id.trim();
    let unsafe_char = |c: char| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control();
    if id.is_empty() || id.contains("..") || id.chars().any(unsafe_char) {
        warn!(what = what, "Rejected unsafe path segment");
        return Err(GatewayError::invalid_request(format!("Invalid {what}")));
    }
    Ok(id)
}

/// Send a request and return the response if it is 2xx
pub async fn send(vendor: Vendor, request: RequestBuilder) -> GatewayResult<Response> {
    // URLs may carry a query-string key
    let response = request.send().await.map_err(|e| {
        let e = e.without_url();
        error!(vendor = %vendor, error = %e, "Vendor request failed");
        GatewayError::network(vendor.as_str(), e.to_string())
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        warn!(vendor = %vendor, ?retry_after, "Vendor rate limited the request");
        return Err(GatewayError::rate_limited(vendor.as_str(), retry_after));
    }

    let body = response.text().await.unwrap_or_default();
    warn!(vendor = %vendor, status = status.as_u16(), "Vendor returned an error");
    Err(parse_error(vendor, status.as_u16(), &body))
}

/// Read a 2xx response body as JSON
pub async fn read_json<T: DeserializeOwned>(vendor: Vendor, response: Response) -> GatewayResult<T> {
    let body = response
        .text()
        .await
        .map_err(|e| {
            GatewayError::network(
                vendor.as_str(),
                format!("Failed to read response: {}", e.without_url()),
            )
        })?;

    trace!(vendor = %vendor, body = %body, "Received vendor response");

    serde_json::from_str(&body)
        .map_err(|e| GatewayError::invalid_shape(vendor.as_str(), format!("Invalid response JSON: {e}")))
}

/// Map a non-2xx body to an upstream error
pub fn parse_error(vendor: Vendor, status: u16, body: &str) -> GatewayError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| error_message(&v))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                body.trim().to_string()
            }
        });
    GatewayError::upstream(vendor.as_str(), status, message)
}

/// Pull the human-readable message out of the error shapes vendors use:
/// `{error:{message}}`, `{error:"..."}`, `{detail:"..."}`,
/// `{detail:[{msg}]}`, `{detail:{message}}` and `{message}`.
fn error_message(value: &Value) -> Option<String> {
    let text = |v: &Value| v.as_str().map(str::to_string);

    if let Some(err) = value.get("error") {
        return text(err).or_else(|| err.get("message").and_then(text));
    }
    if let Some(detail) = value.get("detail") {
        return text(detail)
            .or_else(|| detail.get("message").and_then(text))
            .or_else(|| {
                detail
                    .as_array()
                    .and_then(|items| items.first())
                    .and_then(|item| item.get("msg"))
                    .and_then(text)
            });
    }
    value.get("message").and_then(text)
}
