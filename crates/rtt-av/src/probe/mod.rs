//! Media probing via the `ffprobe` CLI.

pub mod ffprobe;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rtt_core::{Error, Result, VideoAsset};

use crate::command::{ToolCommand, ToolFailure};

pub use self::ffprobe::parse_probe_output;

/// Reads duration, audio presence and time base of a video file.
#[derive(Debug, Clone)]
pub struct MediaProber {
    /// Path to the ffprobe binary.
    ffprobe_path: PathBuf,
    timeout: Option<Duration>,
}

impl MediaProber {
    /// Create a new prober using the given ffprobe path.
    pub fn new(ffprobe_path: PathBuf) -> Self {
        Self {
            ffprobe_path,
            timeout: None,
        }
    }

    /// Bound every probe invocation by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Probe `path`, which must already be resolved and canonical.
    ///
    /// # Errors
    ///
    /// - [`Error::ProbeExecution`] if ffprobe cannot run or exits non-zero.
    /// - [`Error::ProbeParse`] if its output is not the expected JSON.
    /// - [`Error::DurationUnavailable`] if no duration is reported.
    pub async fn probe(&self, path: &Path) -> Result<VideoAsset> {
        let mut cmd = ToolCommand::new(self.ffprobe_path.clone());
        cmd.args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-show_entries",
            "stream=index,codec_type,duration,time_base",
            "-of",
            "json",
        ]);
        cmd.arg(path.to_string_lossy());
        cmd.timeout(self.timeout);

        let output = cmd.execute().await.map_err(probe_failure)?;
        let asset = parse_probe_output(path, &output.stdout_text())?;

        tracing::debug!(
            path = %path.display(),
            duration = %asset.duration,
            has_audio = asset.has_audio,
            time_base = %asset.time_base,
            "Probed video"
        );
        Ok(asset)
    }
}

fn probe_failure(failure: ToolFailure) -> Error {
    tracing::error!(error = %failure, "ffprobe failed");
    Error::ProbeExecution(failure.to_string())
}
