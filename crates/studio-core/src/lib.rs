//! # Studio Core
//!
//! Core types, vendor traits, and error handling for the studio generation
//! gateway.
//!
//! This crate provides the foundational types used throughout the gateway:
//! - Generation requests and model preferences
//! - Vendor and model identifiers
//! - Asynchronous job state machine
//! - Vendor adapter traits
//! - HTTP wire types
//! - Error types and handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod asset;
pub mod error;
pub mod job;
pub mod model;
pub mod provider;
pub mod request;

// Re-export commonly used types
pub use asset::Asset;
pub use error::{GatewayError, GatewayResult};
pub use job::{GenerationJob, JobStatus, StatusReport};
pub use model::{ImageModel, ModelRoute, SpeechModel, Vendor, VideoModel};
pub use provider::{ImageGenerator, SpeechSynthesizer, TextGenerator, VideoGenerator};
pub use request::{
    ExplicitVendor, GenerationRequest, ImageRequest, MediaKind, ModelPreference, SpeechRequest,
    TextRequest, VideoRequest,
};
