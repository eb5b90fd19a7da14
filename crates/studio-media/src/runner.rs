//! External media process execution.

use async_trait::async_trait;
use studio_core::{GatewayError, GatewayResult};
use tracing::{debug, error};

const STDERR_TAIL_LINES: usize = 12;

/// Runs the media binary
#[async_trait]
pub trait MediaProcessRunner: Send + Sync {
    /// Run `program` with `args`; a non-zero exit is a `Mux` error
    async fn run(&self, program: &str, args: &[String]) -> GatewayResult<()>;
}

/// Runs ffmpeg as a child process
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegRunner;

#[async_trait]
impl MediaProcessRunner for FfmpegRunner {
    async fn run(&self, program: &str, args: &[String]) -> GatewayResult<()> {
        debug!(program = program, args = ?args, "Running media process");

        let output = tokio::process::Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| GatewayError::mux(format!("failed to execute {program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail = stderr_tail(&stderr);
            error!(program = program, status = %output.status, stderr = %tail, "Media process failed");
            return Err(GatewayError::mux(format!(
                "{program} exited with {}: {tail}",
                output.status
            )));
        }

        Ok(())
    }
}

/// Last few non-empty lines of stderr
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_tail() {
        let stderr: String = (1..=20).map(|i| format!("line {i}\n")).collect();
        let tail = stderr_tail(&stderr);
        assert!(tail.starts_with("line 9"));
        assert!(tail.ends_with("line 20"));
        assert_eq!(stderr_tail("\n\nonly\n"), "only");
    }

    #[tokio::test]
    async fn test_missing_binary_is_mux_error() {
        let err = FfmpegRunner
            .run("studio-definitely-not-a-binary", &["-version".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Mux { .. }));
    }
}
