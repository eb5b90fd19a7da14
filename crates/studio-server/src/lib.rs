//! # Studio Server
//!
//! HTTP server for the studio generation gateway.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Proxy endpoints for image, audio, video and text generation
//! - The orchestrator endpoint with video job polling
//! - Media muxing and a same-origin fetch proxy
//! - Health, readiness and Prometheus endpoints
//! - Graceful shutdown handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod orchestrator;
pub mod proxy;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;

// Re-export main types
pub use error::ApiError;
pub use routes::create_router;
pub use server::Server;
pub use shutdown::shutdown_signal;
pub use state::{AppState, AppStateBuilder};
