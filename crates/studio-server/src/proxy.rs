//! Same-origin fetch proxy for vendor-hosted media.
//!
//! Streams the upstream body back with its content type and a one hour
//! public cache lifetime, so browsers can play or re-upload media that the
//! vendor's CDN would refuse cross-origin.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use reqwest::{StatusCode, Url};
use studio_core::api::{require, ProxyQuery};
use studio_core::{GatewayError, GatewayResult};
use tracing::{debug, instrument, warn};

use crate::{error::ApiError, state::AppState};

/// Cache policy applied to every proxied response
pub const PROXY_CACHE_CONTROL: &str = "public, max-age=3600";

const PROXY: &str = "proxy";

fn parse_target(raw: &str) -> GatewayResult<Url> {
    let url = Url::parse(raw)
        .map_err(|e| GatewayError::invalid_field("url", format!("Invalid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(GatewayError::invalid_field(
            "url",
            format!("Unsupported URL scheme: {other}"),
        )),
    }
}

/// `GET /api/proxy-image` and `GET /api/migration-proxy`
#[instrument(skip_all, fields(endpoint = "proxy"))]
pub async fn proxy(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response, ApiError> {
    let target = parse_target(require(query.url.as_ref(), "url")?)?;
    let host = target.host_str().unwrap_or_default().to_string();

    let upstream = state
        .proxy_client
        .get(target)
        .send()
        .await
        .map_err(|e| GatewayError::network(PROXY, e.without_url().to_string()))?;

    let status = upstream.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(GatewayError::rate_limited(PROXY, None).into());
    }
    if !status.is_success() {
        warn!(host = %host, status = status.as_u16(), "Proxy upstream returned an error");
        return Err(GatewayError::upstream(PROXY, status.as_u16(), format!("HTTP {}", status.as_u16())).into());
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    let content_length = upstream.headers().get(header::CONTENT_LENGTH).cloned();

    debug!(host = %host, content_type = ?content_type, "Proxying upstream body");

    let mut response = Body::from_stream(upstream.bytes_stream()).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(PROXY_CACHE_CONTROL));
    if let Some(length) = content_length {
        headers.insert(header::CONTENT_LENGTH, length);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert!(parse_target("https://cdn.example.com/a.png").is_ok());
        assert!(parse_target("http://localhost:9000/b.mp4").is_ok());

        let err = parse_target("file:///etc/passwd").unwrap_err();
        assert_eq!(err.http_status(), 400);
        assert!(parse_target("not a url").is_err());
    }
}
