//! Lays dialogue and music under a generated video.
//!
//! With no audio the video URL is returned untouched and nothing is
//! downloaded or spawned. Otherwise the inputs are fetched into a scratch
//! directory, muxed by the media binary, and returned as a
//! `data:video/mp4;base64,` URL. The scratch directory goes away on every
//! exit path.

use crate::filter::{mux_args, AudioTracks, MixSettings};
use crate::runner::{FfmpegRunner, MediaProcessRunner};
use base64::Engine;
use futures_util::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use studio_config::MediaConfig;
use studio_core::{GatewayError, GatewayResult};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Mux request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MuxRequest {
    /// Generated video
    pub video_url: String,
    /// Dialogue track
    pub dialogue_url: Option<String>,
    /// Background music
    pub music_url: Option<String>,
}

impl MuxRequest {
    /// Request with no audio
    #[must_use]
    pub fn new(video_url: impl Into<String>) -> Self {
        Self {
            video_url: video_url.into(),
            ..Self::default()
        }
    }

    /// Add dialogue
    #[must_use]
    pub fn with_dialogue(mut self, url: impl Into<String>) -> Self {
        self.dialogue_url = Some(url.into());
        self
    }

    /// Add music
    #[must_use]
    pub fn with_music(mut self, url: impl Into<String>) -> Self {
        self.music_url = Some(url.into());
        self
    }
}

fn present(url: Option<&String>) -> Option<&str> {
    url.map(|u| u.trim()).filter(|u| !u.is_empty())
}

/// Media post-processor
#[derive(Clone)]
pub struct Muxer {
    client: Client,
    runner: Arc<dyn MediaProcessRunner>,
    program: String,
    scratch_root: PathBuf,
    settings: MixSettings,
}

impl std::fmt::Debug for Muxer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Muxer")
            .field("program", &self.program)
            .field("scratch_root", &self.scratch_root)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Muxer {
    /// Muxer running ffmpeg
    pub fn new(config: &MediaConfig) -> GatewayResult<Self> {
        Self::with_runner(config, Arc::new(FfmpegRunner))
    }

    /// Muxer with a custom process runner
    pub fn with_runner(config: &MediaConfig, runner: Arc<dyn MediaProcessRunner>) -> GatewayResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| GatewayError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            runner,
            program: config.ffmpeg_path.clone(),
            scratch_root: config.scratch_root(),
            settings: MixSettings {
                sample_rate: config.sample_rate,
                bgm_volume: config.bgm_volume,
            },
        })
    }

    /// Mux the request's audio into its video
    pub async fn mux(&self, request: &MuxRequest) -> GatewayResult<String> {
        let video_url = request.video_url.trim();
        if video_url.is_empty() {
            return Err(GatewayError::missing_field("videoUrl"));
        }

        let dialogue_url = present(request.dialogue_url.as_ref());
        let music_url = present(request.music_url.as_ref());
        if dialogue_url.is_none() && music_url.is_none() {
            debug!("No audio to mux, returning video unchanged");
            return Ok(video_url.to_string());
        }

        let scratch = self.scratch().await?;
        let result = self
            .mux_in(scratch.path(), video_url, dialogue_url, music_url)
            .await;

        // error paths fall back to TempDir's drop
        if result.is_ok() {
            let path = scratch.path().to_path_buf();
            match scratch.close() {
                Ok(()) => debug!(path = %path.display(), "Removed scratch directory"),
                Err(e) => warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to remove scratch directory"
                ),
            }
        }
        result
    }

    /// A fresh `studio-mux-*` directory under the scratch root
    async fn scratch(&self) -> GatewayResult<TempDir> {
        tokio::fs::create_dir_all(&self.scratch_root)
            .await
            .map_err(|e| GatewayError::mux(format!("failed to create scratch directory: {e}")))?;

        let root = self.scratch_root.clone();
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new().prefix("studio-mux-").tempdir_in(root)
        })
        .await
        .map_err(|e| GatewayError::internal(format!("scratch task failed: {e}")))?
        .map_err(|e| GatewayError::mux(format!("failed to create scratch directory: {e}")))?;

        debug!(path = %dir.path().display(), "Created scratch directory");
        Ok(dir)
    }

    async fn mux_in(
        &self,
        dir: &Path,
        video_url: &str,
        dialogue_url: Option<&str>,
        music_url: Option<&str>,
    ) -> GatewayResult<String> {
        let video = dir.join("video.mp4");
        self.download(video_url, &video).await?;

        let dialogue = match dialogue_url {
            Some(url) => {
                let path = dir.join("dialogue.audio");
                self.download(url, &path).await?;
                Some(path)
            }
            None => None,
        };
        let music = match music_url {
            Some(url) => {
                let path = dir.join("bgm.audio");
                self.download(url, &path).await?;
                Some(path)
            }
            None => None,
        };

        let output = dir.join("out.mp4");
        let tracks = AudioTracks {
            dialogue: dialogue.as_deref(),
            music: music.as_deref(),
        };
        let args = mux_args(&video, &tracks, &output, &self.settings)
            .ok_or_else(|| GatewayError::internal("no audio tracks to mux"))?;

        self.runner.run(&self.program, &args).await?;

        let bytes = tokio::fs::read(&output)
            .await
            .map_err(|e| GatewayError::mux(format!("failed to read mux output: {e}")))?;

        info!(
            dialogue = dialogue_url.is_some(),
            music = music_url.is_some(),
            bytes = bytes.len(),
            "Muxed video"
        );

        Ok(format!(
            "data:video/mp4;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes)
        ))
    }

    async fn download(&self, url: &str, dest: &Path) -> GatewayResult<()> {
        debug!(dest = %dest.display(), "Downloading media input");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GatewayError::mux(format!("failed to download {url}: {}", e.without_url())))?;

        if !response.status().is_success() {
            return Err(GatewayError::mux(format!(
                "failed to download {url}: HTTP {}",
                response.status().as_u16()
            )));
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| GatewayError::mux(format!("failed to create {}: {e}", dest.display())))?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| GatewayError::mux(format!("failed to download {url}: {}", e.without_url())))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| GatewayError::mux(format!("failed to write {}: {e}", dest.display())))?;
        }
        file.flush()
            .await
            .map_err(|e| GatewayError::mux(format!("failed to write {}: {e}", dest.display())))?;

        Ok(())
    }
}
