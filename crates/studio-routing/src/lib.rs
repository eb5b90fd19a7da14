//! # Studio Routing
//!
//! Provider routing for the studio generation gateway.
//!
//! This crate provides:
//! - Rule-based video model selection (lip-sync, explicit vendor, fast, quality, auto)
//! - Static image model selection
//! - Speech provider selection by explicit provider or voice id shape

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod router;

// Re-export main types
pub use router::{ProviderRouter, RouteDecision, RouteReason, RouterConfig};
