//! Per-segment transcoding with ffmpeg.
//!
//! Each [`TranscodeRequest`] maps to exactly one ffmpeg process that seeks
//! to the window, re-encodes it to H.264 (plus AAC when the source has
//! audio) and writes an MPEG-TS stream to stdout, which is buffered in full.

use std::path::PathBuf;
use std::time::Duration;

use rtt_core::config::TranscodeConfig;
use rtt_core::{Error, Result, SegmentWindow};

use crate::command::{ToolCommand, ToolFailure};
use crate::tools::EncoderProfile;

/// Everything that determines one transcoder invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeRequest {
    /// Canonical path of the source video.
    pub path: PathBuf,
    pub window: SegmentWindow,
    /// Whether to map and encode the first audio stream.
    pub has_audio: bool,
}

/// Process-wide encoder settings, fixed at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeSettings {
    pub profile: EncoderProfile,
    pub video_bitrate: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    pub timeout: Option<Duration>,
}

impl TranscodeSettings {
    pub fn from_config(config: &TranscodeConfig, profile: EncoderProfile) -> Self {
        Self {
            profile,
            video_bitrate: config.video_bitrate.clone(),
            audio_codec: config.audio_codec.clone(),
            audio_bitrate: config.audio_bitrate.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Build the ffmpeg argument list for `request`.
///
/// Identical inputs always yield identical arguments. The mux delay and
/// preload are half the window start, which keeps timestamps continuous
/// across segments that are each encoded from zero.
pub fn build_args(request: &TranscodeRequest, settings: &TranscodeSettings) -> Vec<String> {
    let start = request.window.start;
    let half = start.halved().to_string();

    let mut args: Vec<String> = Vec::with_capacity(40);

    if let Some(ref decoder) = settings.profile.decoder {
        args.push("-hwaccel".into());
        args.push(decoder.clone());
    }

    args.extend([
        "-ss".to_string(),
        start.to_string(),
        "-t".to_string(),
        request.window.duration.to_string(),
        "-accurate_seek".to_string(),
        "-i".to_string(),
        request.path.to_string_lossy().to_string(),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-c:v".to_string(),
        settings.profile.encoder.clone(),
        "-b:v".to_string(),
        settings.video_bitrate.clone(),
        "-bsf:v".to_string(),
        "h264_mp4toannexb".to_string(),
    ]);

    if request.has_audio {
        args.extend([
            "-map".to_string(),
            "0:a:0".to_string(),
            "-c:a".to_string(),
            settings.audio_codec.clone(),
            "-b:a".to_string(),
            settings.audio_bitrate.clone(),
        ]);
    }

    args.extend([
        "-avoid_negative_ts".to_string(),
        "make_zero".to_string(),
        "-start_at_zero".to_string(),
        "-muxdelay".to_string(),
        half.clone(),
        "-muxpreload".to_string(),
        half,
        "-f".to_string(),
        "mpegts".to_string(),
        "pipe:1".to_string(),
    ]);

    args
}

/// Runs one ffmpeg process per segment request.
#[derive(Debug, Clone)]
pub struct TranscodeWorker {
    ffmpeg_path: PathBuf,
    settings: TranscodeSettings,
}

impl TranscodeWorker {
    pub fn new(ffmpeg_path: PathBuf, settings: TranscodeSettings) -> Self {
        Self {
            ffmpeg_path,
            settings,
        }
    }

    /// Transcode `request` and return the complete MPEG-TS segment.
    ///
    /// The child is killed if this future is dropped before it finishes.
    ///
    /// # Errors
    ///
    /// - [`Error::TranscodeLaunch`] if ffmpeg cannot be started.
    /// - [`Error::TranscodeFailed`] if it exits non-zero; stderr is attached.
    pub async fn run(&self, request: &TranscodeRequest) -> Result<Vec<u8>> {
        let args = build_args(request, &self.settings);

        tracing::info!(
            path = %request.path.display(),
            index = request.window.index,
            start = %request.window.start,
            duration = %request.window.duration,
            audio = request.has_audio,
            encoder = %self.settings.profile.encoder,
            "Starting segment transcode"
        );
        tracing::debug!(args = ?args, "ffmpeg arguments");

        let mut cmd = ToolCommand::new(self.ffmpeg_path.clone());
        cmd.args(args).timeout(self.settings.timeout);

        let output = cmd.execute().await.map_err(|failure| {
            tracing::error!(
                path = %request.path.display(),
                start = %request.window.start,
                error = %failure,
                "Segment transcode failed"
            );
            transcode_failure(failure)
        })?;

        tracing::info!(
            path = %request.path.display(),
            start = %request.window.start,
            bytes = output.stdout.len(),
            "Segment transcode finished"
        );
        Ok(output.stdout)
    }
}

fn transcode_failure(failure: ToolFailure) -> Error {
    match failure {
        ToolFailure::Spawn { source, .. } => Error::TranscodeLaunch(source.to_string()),
        ToolFailure::Exit { output, .. } => Error::TranscodeFailed {
            status: output.status,
            stderr: output.stderr,
        },
        ToolFailure::Wait { source, .. } => Error::Io { source },
        ToolFailure::TimedOut { after, .. } => {
            Error::Internal(format!("transcoder timed out after {after:?}"))
        }
    }
}
