//! ffmpeg argument construction.
//!
//! Input 0 is always the video. Dialogue and music, when present, follow
//! in that order. Every audio input is resampled to a common rate and
//! stereo float layout; music is attenuated and mixed under dialogue.

use std::path::Path;

/// Audio tracks to lay under the video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioTracks<'a> {
    /// Dialogue file
    pub dialogue: Option<&'a Path>,
    /// Background music file
    pub music: Option<&'a Path>,
}

impl AudioTracks<'_> {
    /// Whether there is anything to mix
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dialogue.is_none() && self.music.is_none()
    }
}

/// Mixing parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixSettings {
    /// Common sample rate
    pub sample_rate: u32,
    /// Music gain
    pub bgm_volume: f32,
}

impl Default for MixSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            bgm_volume: 0.25,
        }
    }
}

fn normalize(input: usize, settings: &MixSettings) -> String {
    format!(
        "[{input}:a]aresample={},aformat=sample_fmts=fltp:channel_layouts=stereo",
        settings.sample_rate
    )
}

/// The `-filter_complex` graph; its output pad is `[aout]`
#[must_use]
pub fn filter_graph(tracks: &AudioTracks<'_>, settings: &MixSettings) -> Option<String> {
    let volume = format!("volume={}", settings.bgm_volume);
    match (tracks.dialogue.is_some(), tracks.music.is_some()) {
        (false, false) => None,
        (true, false) => Some(format!("{}[aout]", normalize(1, settings))),
        (false, true) => Some(format!("{},{volume}[aout]", normalize(1, settings))),
        (true, true) => Some(format!(
            "{}[dlg];{},{volume}[bgm];[dlg][bgm]amix=inputs=2:duration=longest[aout]",
            normalize(1, settings),
            normalize(2, settings)
        )),
    }
}

/// Full ffmpeg argument list, or `None` when there is no audio to mux
#[must_use]
pub fn mux_args(
    video: &Path,
    tracks: &AudioTracks<'_>,
    output: &Path,
    settings: &MixSettings,
) -> Option<Vec<String>> {
    let graph = filter_graph(tracks, settings)?;

    let mut args = vec!["-i".to_string(), video.display().to_string()];
    for track in [tracks.dialogue, tracks.music].into_iter().flatten() {
        args.push("-i".to_string());
        args.push(track.display().to_string());
    }
    args.extend(
        [
            "-filter_complex",
            graph.as_str(),
            "-map",
            "0:v",
            "-map",
            "[aout]",
            "-c:v",
            "copy",
            "-c:a",
            "aac",
            "-shortest",
            "-y",
        ]
        .iter()
        .map(|s| (*s).to_string()),
    );
    args.push(output.display().to_string());
    Some(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(args: &[String]) -> String {
        args.join(" ")
    }

    #[test]
    fn test_no_audio_means_no_graph() {
        let tracks = AudioTracks {
            dialogue: None,
            music: None,
        };
        assert!(tracks.is_empty());
        assert!(filter_graph(&tracks, &MixSettings::default()).is_none());
        assert!(mux_args(Path::new("v.mp4"), &tracks, Path::new("o.mp4"), &MixSettings::default()).is_none());
    }

    #[test]
    fn test_dialogue_only() {
        let tracks = AudioTracks {
            dialogue: Some(Path::new("dialogue.audio")),
            music: None,
        };
        let graph = filter_graph(&tracks, &MixSettings::default()).unwrap();
        assert_eq!(
            graph,
            "[1:a]aresample=44100,aformat=sample_fmts=fltp:channel_layouts=stereo[aout]"
        );
    }

    #[test]
    fn test_music_only_is_attenuated() {
        let tracks = AudioTracks {
            dialogue: None,
            music: Some(Path::new("bgm.audio")),
        };
        let graph = filter_graph(&tracks, &MixSettings::default()).unwrap();
        assert!(graph.starts_with("[1:a]aresample=44100"));
        assert!(graph.ends_with(",volume=0.25[aout]"));
        assert!(!graph.contains("amix"));
    }

    #[test]
    fn test_dialogue_and_music_mix() {
        let tracks = AudioTracks {
            dialogue: Some(Path::new("dialogue.audio")),
            music: Some(Path::new("bgm.audio")),
        };
        let args = mux_args(
            Path::new("video.mp4"),
            &tracks,
            Path::new("out.mp4"),
            &MixSettings::default(),
        )
        .unwrap();
        let line = joined(&args);

        assert!(line.starts_with("-i video.mp4 -i dialogue.audio -i bgm.audio -filter_complex"));
        assert!(line.contains("[2:a]aresample=44100,aformat=sample_fmts=fltp:channel_layouts=stereo,volume=0.25[bgm]"));
        assert!(line.contains("[dlg][bgm]amix=inputs=2:duration=longest[aout]"));
        assert!(line.ends_with("-map 0:v -map [aout] -c:v copy -c:a aac -shortest -y out.mp4"));
    }

    #[test]
    fn test_custom_settings() {
        let tracks = AudioTracks {
            dialogue: None,
            music: Some(Path::new("bgm.audio")),
        };
        let graph = filter_graph(
            &tracks,
            &MixSettings {
                sample_rate: 48_000,
                bgm_volume: 0.5,
            },
        )
        .unwrap();
        assert!(graph.contains("aresample=48000"));
        assert!(graph.contains("volume=0.5"));
    }
}
