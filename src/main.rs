//! # Studio Gateway
//!
//! Server-side gateway for the screenwriting studio's AI generation calls.
//! Holds every vendor key and exposes image, video, audio, text, mux and
//! media-proxy endpoints to the browser.
//!
//! ## Usage
//!
//! ```bash
//! # Start with defaults and vendor keys from the environment
//! FAL_KEY=... GEMINI_API_KEY=... studio-gateway
//!
//! # Start with a config file
//! studio-gateway /path/to/studio.yaml
//! STUDIO_CONFIG=/path/to/studio.toml studio-gateway
//!
//! # Override individual settings
//! STUDIO_PORT=9000 studio-gateway
//! ```

use std::env;
use std::path::PathBuf;
use studio_config::load_config;
use studio_server::Server;
use studio_telemetry::{init_telemetry, shutdown_telemetry};
use tracing::{error, info};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Application failed");
        eprintln!("studio-gateway: {e}");
        std::process::exit(1);
    }
}

/// Config file from the first argument, then `STUDIO_CONFIG`
fn config_path() -> Option<PathBuf> {
    env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::var_os("STUDIO_CONFIG").map(PathBuf::from))
}

/// Main application logic
async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path();
    let config = load_config(path.as_deref()).await?;

    let tracer_provider = init_telemetry(&config.telemetry)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        config_file = ?path,
        "Starting studio gateway"
    );

    let result = match Server::from_config(config) {
        Ok(server) => server.run().await,
        Err(e) => Err(e),
    };

    shutdown_telemetry(tracer_provider);
    result.map_err(Into::into)
}
