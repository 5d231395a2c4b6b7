//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries all
//! sub-configs for the server, segment planning, transcoding, and external
//! tools. Every section defaults sensibly so a completely empty `{}` file is
//! valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::media::PlanningStrategy;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub segment: SegmentConfig,
    pub transcode: TranscodeConfig,
    pub tools: ToolsConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.segment.length_secs == 0 {
            warnings.push(format!(
                "segment.length_secs is 0; using {DEFAULT_SEGMENT_LENGTH_SECS}"
            ));
        }

        if self.transcode.max_concurrent == 0 {
            warnings.push(
                "transcode.max_concurrent is 0; every segment request will be rejected".into(),
            );
        }

        let valid = ["auto", "none"];
        if !valid.contains(&self.transcode.hw_accel.as_str()) {
            warnings.push(format!(
                "transcode.hw_accel '{}' is not recognized (valid: {})",
                self.transcode.hw_accel,
                valid.join(", ")
            ));
        }

        if let Some(ref root) = self.server.root_dir {
            if !root.is_dir() {
                warnings.push(format!(
                    "server.root_dir {} is not a directory",
                    root.display()
                ));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Default nominal segment length for fixed planning.
pub const DEFAULT_SEGMENT_LENGTH_SECS: u32 = 5;

/// Default cap on concurrent transcoder processes.
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory that every client path is confined to.
    pub root_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8082,
            root_dir: None,
        }
    }
}

/// Segment planning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    pub strategy: PlanningStrategy,
    /// Nominal segment length in whole seconds (fixed planning).
    pub length_secs: u32,
}

impl SegmentConfig {
    /// The configured length, with 0 replaced by the default.
    pub fn effective_length_secs(&self) -> u32 {
        if self.length_secs == 0 {
            DEFAULT_SEGMENT_LENGTH_SECS
        } else {
            self.length_secs
        }
    }
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            strategy: PlanningStrategy::default(),
            length_secs: DEFAULT_SEGMENT_LENGTH_SECS,
        }
    }
}

/// Transcoder invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    /// Maximum number of transcoder processes running at once.
    pub max_concurrent: usize,
    #[serde(default = "default_video_bitrate")]
    pub video_bitrate: String,
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,
    /// Encoder used when no hardware encoder is detected.
    #[serde(default = "default_software_encoder")]
    pub software_encoder: String,
    /// `auto` probes ffmpeg for hardware support at startup, `none` skips it.
    #[serde(default = "default_hw_accel")]
    pub hw_accel: String,
    /// Optional wall-clock limit for a single transcode. Unbounded when unset.
    pub timeout_secs: Option<u64>,
}

fn default_video_bitrate() -> String {
    "4567k".into()
}
fn default_audio_codec() -> String {
    "aac".into()
}
fn default_audio_bitrate() -> String {
    "256k".into()
}
fn default_software_encoder() -> String {
    "h264".into()
}
fn default_hw_accel() -> String {
    "auto".into()
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            video_bitrate: default_video_bitrate(),
            audio_codec: default_audio_codec(),
            audio_bitrate: default_audio_bitrate(),
            software_encoder: default_software_encoder(),
            hw_accel: default_hw_accel(),
            timeout_secs: None,
        }
    }
}

/// Paths to external CLI tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = Config::default();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8082);
        assert_eq!(cfg.segment.strategy, PlanningStrategy::Fixed);
        assert_eq!(cfg.segment.length_secs, 5);
        assert_eq!(cfg.transcode.max_concurrent, 10);
        assert_eq!(cfg.transcode.video_bitrate, "4567k");
        assert_eq!(cfg.transcode.audio_bitrate, "256k");
        assert_eq!(cfg.transcode.software_encoder, "h264");
        assert_eq!(cfg.transcode.hw_accel, "auto");
        assert!(cfg.transcode.timeout_secs.is_none());
    }

    #[test]
    fn default_config_no_warnings() {
        let cfg = Config::default();
        let warnings = cfg.validate();
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    }

    #[test]
    fn parse_json_config() {
        let json = r#"{
            "segment": {"strategy": "keyframe", "length_secs": 8},
            "server": {"port": 9090}
        }"#;
        let cfg = Config::from_json(json).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.segment.strategy, PlanningStrategy::Keyframe);
        assert_eq!(cfg.segment.length_secs, 8);
    }

    #[test]
    fn parse_empty_json_uses_defaults() {
        let cfg = Config::from_json("{}").unwrap();
        assert_eq!(cfg.server.port, 8082);
        assert_eq!(cfg.transcode.max_concurrent, 10);
    }

    #[test]
    fn parse_invalid_json_is_validation_error() {
        let err = Config::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn zero_length_warns_and_falls_back() {
        let mut cfg = Config::default();
        cfg.segment.length_secs = 0;
        assert!(cfg.validate().iter().any(|w| w.contains("length_secs")));
        assert_eq!(cfg.segment.effective_length_secs(), 5);
    }

    #[test]
    fn unknown_hw_accel_warns() {
        let mut cfg = Config::default();
        cfg.transcode.hw_accel = "vulkan".into();
        assert!(cfg.validate().iter().any(|w| w.contains("hw_accel")));
    }

    #[test]
    fn load_or_default_with_none() {
        let cfg = Config::load_or_default(None);
        assert_eq!(cfg.server.port, 8082);
    }

    #[test]
    fn load_or_default_with_missing_file() {
        let cfg = Config::load_or_default(Some(Path::new("/nonexistent/rttstream.json")));
        assert_eq!(cfg.server.port, 8082);
    }

    #[test]
    fn load_or_default_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rttstream.json");
        std::fs::write(&path, r#"{"transcode": {"max_concurrent": 3}}"#).unwrap();
        let cfg = Config::load_or_default(Some(&path));
        assert_eq!(cfg.transcode.max_concurrent, 3);
    }
}
