//! Route definitions for the gateway API.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{handlers, orchestrator, proxy, state::AppState};

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/healthz", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/live", get(handlers::liveness_check))
        // Metrics endpoint
        .route("/metrics", get(handlers::metrics_endpoint))
        // Proxy endpoints
        .nest("/api", api_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Generation and proxy routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/generate-image", post(handlers::generate_image))
        .route("/generate-audio", post(handlers::generate_audio))
        .route("/generate-video", post(handlers::generate_video))
        .route("/orchestrator", post(orchestrator::orchestrate))
        .route("/mux-video", post(handlers::mux_video))
        .route("/gemini", post(handlers::gemini))
        .route("/proxy-image", get(proxy::proxy))
        .route("/migration-proxy", get(proxy::proxy))
        .route_layer(middleware::from_fn_with_state(state, record_duration))
}

/// Observe per-endpoint latency
async fn record_duration(
    State(state): State<AppState>,
    path: MatchedPath,
    request: Request,
    next: Next,
) -> Response {
    let endpoint = path.as_str().rsplit('/').next().unwrap_or_default().to_string();
    let start = Instant::now();
    let response = next.run(request).await;
    state.metrics.observe_request_duration(&endpoint, start.elapsed());
    response
}
