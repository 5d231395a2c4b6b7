//! FFprobe JSON output structures and their mapping into a [`VideoAsset`].
//!
//! The prober asks ffprobe for `format=duration` and
//! `stream=index,codec_type,duration,time_base` as JSON, and only the
//! handful of fields below are read.

use std::path::Path;

use rtt_core::{Error, Result, TimeBase, Timestamp, VideoAsset};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    duration: Option<String>,
    time_base: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Map raw ffprobe JSON for `path` into a [`VideoAsset`].
///
/// Duration comes from the first video stream, falling back to the container
/// when the stream value is absent or not numeric. The result is rounded to
/// four decimals.
pub fn parse_probe_output(path: &Path, json: &str) -> Result<VideoAsset> {
    let output: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| Error::ProbeParse(format!("ffprobe JSON parse error: {e}")))?;

    let video = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));

    let has_audio = output
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    let stream_duration = video
        .and_then(|s| s.duration.as_deref())
        .and_then(parse_secs);
    let format_duration = output
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(parse_secs);

    let duration = stream_duration
        .or(format_duration)
        .ok_or(Error::DurationUnavailable)?;

    let time_base = video
        .and_then(|s| s.time_base.as_deref())
        .and_then(TimeBase::parse)
        .unwrap_or_default();

    Ok(VideoAsset {
        path: path.to_path_buf(),
        duration,
        has_audio,
        time_base,
        keyframes: None,
    })
}

fn parse_secs(raw: &str) -> Option<Timestamp> {
    let secs: f64 = raw.trim().parse().ok()?;
    Timestamp::from_secs_round(secs)
}
