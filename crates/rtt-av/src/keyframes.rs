//! Keyframe timestamp extraction via `ffprobe`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rtt_core::{Error, Result, TimeBase, Timestamp};
use serde::Deserialize;

use crate::command::ToolCommand;

/// Lists the presentation times of every key picture in the first video
/// stream.
#[derive(Debug, Clone)]
pub struct KeyframeExtractor {
    ffprobe_path: PathBuf,
    timeout: Option<Duration>,
}

#[derive(Debug, Deserialize)]
struct FramesOutput {
    #[serde(default)]
    frames: Vec<FrameEntry>,
}

#[derive(Debug, Deserialize)]
struct FrameEntry {
    pts: Option<i64>,
    best_effort_timestamp: Option<i64>,
}

impl KeyframeExtractor {
    pub fn new(ffprobe_path: PathBuf) -> Self {
        Self {
            ffprobe_path,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extract keyframe start times for `path`, scaled by `time_base`.
    ///
    /// Fails with [`Error::KeyframeExtraction`] when ffprobe cannot run or
    /// its output is unusable.
    pub async fn extract(&self, path: &Path, time_base: TimeBase) -> Result<Vec<Timestamp>> {
        let mut cmd = ToolCommand::new(self.ffprobe_path.clone());
        cmd.args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-skip_frame",
            "nokey",
            "-show_entries",
            "frame=pts,best_effort_timestamp",
            "-of",
            "json",
        ]);
        cmd.arg(path.to_string_lossy());
        cmd.timeout(self.timeout);

        let output = cmd.execute().await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Keyframe extraction failed");
            Error::KeyframeExtraction(e.to_string())
        })?;

        let keyframes = parse_keyframes(&output.stdout_text(), time_base)?;
        tracing::debug!(
            path = %path.display(),
            count = keyframes.len(),
            "Extracted keyframes"
        );
        Ok(keyframes)
    }
}

/// Convert ffprobe frame JSON into keyframe timestamps.
///
/// Each PTS is scaled by `time_base` and rounded up to a tick. Frames
/// without a usable timestamp, or with a negative one, are skipped. The
/// result is in input order; the planner sorts and dedupes.
pub fn parse_keyframes(json: &str, time_base: TimeBase) -> Result<Vec<Timestamp>> {
    let output: FramesOutput = serde_json::from_str(json)
        .map_err(|e| Error::KeyframeExtraction(format!("ffprobe JSON parse error: {e}")))?;

    Ok(output
        .frames
        .iter()
        .filter_map(|f| f.pts.or(f.best_effort_timestamp))
        .filter_map(|pts| Timestamp::from_secs_ceil(time_base.to_secs(pts)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_by_time_base() {
        let json = r#"{"frames": [
            {"pts": 0, "best_effort_timestamp": 0},
            {"pts": 450000, "best_effort_timestamp": 450000},
            {"pts": 900000}
        ]}"#;
        let tb = TimeBase { num: 1, den: 90_000 };
        let kf = parse_keyframes(json, tb).unwrap();
        assert_eq!(
            kf,
            vec![
                Timestamp::ZERO,
                Timestamp::from_whole_secs(5),
                Timestamp::from_whole_secs(10)
            ]
        );
    }

    #[test]
    fn rounds_up_to_tick() {
        // 1001/24000 * 1 = 0.0417083.. -> 0.0418
        let json = r#"{"frames": [{"pts": 1}]}"#;
        let tb = TimeBase { num: 1001, den: 24_000 };
        let kf = parse_keyframes(json, tb).unwrap();
        assert_eq!(kf, vec![Timestamp::from_ticks(418)]);
    }

    #[test]
    fn falls_back_to_best_effort_and_skips_missing() {
        let json = r#"{"frames": [
            {"best_effort_timestamp": 2000},
            {},
            {"pts": -40}
        ]}"#;
        let kf = parse_keyframes(json, TimeBase::MILLIS).unwrap();
        assert_eq!(kf, vec![Timestamp::from_whole_secs(2)]);
    }

    #[test]
    fn empty_output_is_empty_list() {
        assert!(parse_keyframes("{}", TimeBase::MILLIS).unwrap().is_empty());
    }

    #[test]
    fn garbage_is_extraction_error() {
        let err = parse_keyframes("<xml/>", TimeBase::MILLIS).unwrap_err();
        assert!(matches!(err, Error::KeyframeExtraction(_)));
    }

    #[tokio::test]
    async fn missing_binary_is_extraction_error() {
        let err = KeyframeExtractor::new(PathBuf::from("/nonexistent/ffprobe_xyz"))
            .extract(Path::new("/videos/a.mkv"), TimeBase::MILLIS)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::KeyframeExtraction(_)));
    }
}
