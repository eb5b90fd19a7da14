//! # Studio Providers
//!
//! Vendor adapters for the studio generation gateway.
//!
//! This crate provides:
//! - fal.ai (Flux Pro Ultra images; Kling, Kling AI avatar and MiniMax video)
//! - Luma Dream Machine (Ray 2 and Ray Flash 2 video)
//! - OpenAI and ElevenLabs speech
//! - Gemini text
//! - Typed outbound payloads and shared vendor error mapping
//! - A registry that builds adapters from configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod elevenlabs;
pub mod fal;
pub mod gemini;
pub mod http;
pub mod luma;
pub mod openai;
pub mod payload;
pub mod registry;

// Re-export main types
pub use elevenlabs::ElevenLabsSpeech;
pub use fal::FalProvider;
pub use gemini::GeminiProvider;
pub use luma::LumaProvider;
pub use openai::OpenAiSpeech;
pub use payload::{snap_duration, VendorRequest};
pub use registry::ProviderRegistry;
