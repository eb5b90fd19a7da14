//! # Studio Media
//!
//! Post-processing for generated media: downloads a video with optional
//! dialogue and background music and muxes them into one mp4 through an
//! external ffmpeg process.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod filter;
pub mod muxer;
pub mod runner;

// Re-export main types
pub use filter::{filter_graph, mux_args, AudioTracks, MixSettings};
pub use muxer::{MuxRequest, Muxer};
pub use runner::{FfmpegRunner, MediaProcessRunner};
