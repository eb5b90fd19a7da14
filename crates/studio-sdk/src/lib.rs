//! # Studio SDK
//!
//! Typed client for the studio gateway's proxy endpoints.
//!
//! The gateway surfaces vendor rate limits as HTTP 429 without retrying
//! them. This client is the layer that does: a 429 is retried after 1s,
//! 2s, 4s and so on, up to the configured retry count, before
//! [`Error::RateLimited`] is returned.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use studio_sdk::{Client, GenerateImageBody};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), studio_sdk::Error> {
//!     let client = Client::builder()
//!         .base_url("http://localhost:8080")
//!         .build()?;
//!
//!     let url = client
//!         .generate_image(&GenerateImageBody {
//!             prompt: Some("A lighthouse at dusk".into()),
//!             ..GenerateImageBody::default()
//!         })
//!         .await?;
//!
//!     println!("{url}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod client;
mod config;
mod error;

pub use client::{Client, ClientBuilder, ProxiedMedia};
pub use config::ClientConfig;
pub use error::{Error, Result};

// Re-export wire types for convenience
pub use studio_core::api::{
    GenerateAudioBody, GenerateImageBody, GenerateVideoBody, ImageResult, JobResponse,
    MuxVideoBody, OrchestratorBody, VideoAction,
};
pub use studio_core::JobStatus;
