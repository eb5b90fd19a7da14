//! Vendor adapter traits.
//!
//! Each trait is one seam between orchestration and a vendor's HTTP API.
//! Implementations live in `studio-providers`; tests substitute in-memory
//! fakes.

use crate::error::GatewayResult;
use crate::job::{GenerationJob, StatusReport};
use crate::model::{SpeechModel, Vendor, VideoModel};
use crate::request::{ImageRequest, SpeechRequest, TextRequest, VideoRequest};
use async_trait::async_trait;
use bytes::Bytes;

/// Synchronous image generation
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Vendor behind this generator
    fn vendor(&self) -> Vendor;

    /// Generate one image and return its URL
    async fn generate_image(&self, request: &ImageRequest) -> GatewayResult<String>;
}

/// Asynchronous video generation
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    /// Vendor behind this generator
    fn vendor(&self) -> Vendor;

    /// Submit a job; the vendor answers with a job handle immediately
    async fn submit(&self, model: VideoModel, request: &VideoRequest) -> GatewayResult<GenerationJob>;

    /// Query the status of a previously submitted job
    async fn check_status(&self, job: &GenerationJob) -> GatewayResult<StatusReport>;
}

/// Text-to-speech
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Vendor behind this synthesizer
    fn vendor(&self) -> Vendor;

    /// Synthesize speech; returns MP3 bytes
    async fn synthesize(&self, model: SpeechModel, request: &SpeechRequest) -> GatewayResult<Bytes>;
}

/// Text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Vendor behind this generator
    fn vendor(&self) -> Vendor;

    /// Generate a completion for the prompt
    async fn generate_text(&self, request: &TextRequest) -> GatewayResult<String>;
}
