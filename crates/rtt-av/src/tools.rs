//! External tool detection and management.
//!
//! The [`ToolRegistry`] discovers and caches the locations of the external
//! CLI tools the pipeline shells out to (ffmpeg and ffprobe). The
//! [`EncoderProfile`] records which hardware decoder/encoder pair ffmpeg
//! offers on this host; it is detected once at startup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::command::ToolCommand;

/// Known tool names that the registry manages.
const KNOWN_TOOLS: &[&str] = &["ffmpeg", "ffprobe"];

/// Hardware decoders, in order of preference.
const HW_DECODERS: &[&str] = &["videotoolbox", "cuda", "qsv", "amf"];

/// Hardware H.264 encoders, in order of preference.
const HW_ENCODERS: &[&str] = &["h264_videotoolbox", "h264_nvenc", "h264_qsv", "h264_amf"];

/// Configuration for a single external tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Human-readable tool name (e.g. "ffmpeg").
    pub name: String,
    /// Resolved path to the executable.
    pub path: PathBuf,
}

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// Version string (first line of `-version` output), if available.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Registry holding discovered tool configurations.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolConfig>,
}

impl ToolRegistry {
    /// Discover tools by searching `PATH` (or using overrides from config).
    ///
    /// For each known tool, if the [`rtt_core::config::ToolsConfig`] supplies a
    /// custom path **and** that path exists, it is used directly. Otherwise
    /// [`which::which`] is used to locate the tool in `PATH`. Tools that are
    /// not found are omitted from the registry.
    pub fn discover(tools_config: &rtt_core::config::ToolsConfig) -> Self {
        let mut tools = HashMap::new();

        for &name in KNOWN_TOOLS {
            let custom_path = match name {
                "ffmpeg" => tools_config.ffmpeg_path.as_deref(),
                "ffprobe" => tools_config.ffprobe_path.as_deref(),
                _ => None,
            };

            let resolved = match custom_path {
                Some(p) if p.exists() => Some(p.to_path_buf()),
                Some(p) => {
                    tracing::warn!(
                        tool = name,
                        path = %p.display(),
                        "Configured tool path does not exist; searching PATH"
                    );
                    which::which(name).ok()
                }
                None => which::which(name).ok(),
            };

            match resolved {
                Some(path) => {
                    tracing::debug!(tool = name, path = %path.display(), "Tool discovered");
                    tools.insert(
                        name.to_string(),
                        ToolConfig {
                            name: name.to_string(),
                            path,
                        },
                    );
                }
                None => {
                    tracing::warn!(tool = name, "Tool not found; requests needing it will fail")
                }
            }
        }

        Self { tools }
    }

    /// Path to launch `name` with.
    ///
    /// Falls back to the bare name when the tool was not discovered, so a
    /// missing tool surfaces as a spawn failure at the point of use rather
    /// than preventing startup.
    pub fn program(&self, name: &str) -> PathBuf {
        self.tools
            .get(name)
            .map(|cfg| cfg.path.clone())
            .unwrap_or_else(|| PathBuf::from(name))
    }

    /// Check all known tools and return availability information.
    pub async fn check_all(&self) -> Vec<ToolInfo> {
        let mut infos = Vec::with_capacity(KNOWN_TOOLS.len());
        for &name in KNOWN_TOOLS {
            let info = match self.tools.get(name) {
                Some(cfg) => ToolInfo {
                    name: name.to_string(),
                    available: true,
                    version: detect_version(&cfg.path).await,
                    path: Some(cfg.path.clone()),
                },
                None => ToolInfo {
                    name: name.to_string(),
                    available: false,
                    version: None,
                    path: None,
                },
            };
            infos.push(info);
        }
        infos
    }
}

/// Run `<tool> -version` and return the first line of stdout.
async fn detect_version(path: &Path) -> Option<String> {
    let output = ToolCommand::new(path.to_path_buf())
        .arg("-version")
        .execute()
        .await
        .ok()?;

    output.stdout_text().lines().next().map(|s| s.to_string())
}

// ---------------------------------------------------------------------------
// EncoderProfile
// ---------------------------------------------------------------------------

/// The decoder/encoder pair every transcode uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderProfile {
    /// Value for `-hwaccel`, or `None` for software decoding.
    pub decoder: Option<String>,
    /// Value for `-c:v`.
    pub encoder: String,
}

impl EncoderProfile {
    /// Software decode plus the given software encoder.
    pub fn software(encoder: impl Into<String>) -> Self {
        Self {
            decoder: None,
            encoder: encoder.into(),
        }
    }

    /// Ask ffmpeg which hardware decoders and encoders it supports and pick
    /// the first available of each.
    ///
    /// Detection never fails: if ffmpeg cannot be run, or reports nothing
    /// usable, the corresponding half falls back to software.
    pub async fn detect(ffmpeg: &Path, software_encoder: &str) -> Self {
        let decoder = match query(ffmpeg, "-hwaccels").await {
            Some(listing) => pick_decoder(&listing),
            None => None,
        };
        match &decoder {
            Some(name) => tracing::info!(decoder = %name, "Hardware decoder detected"),
            None => tracing::info!("No hardware decoder detected; using software decoding"),
        }

        let encoder = match query(ffmpeg, "-encoders").await {
            Some(listing) => pick_encoder(&listing),
            None => None,
        };
        let encoder = match encoder {
            Some(name) => {
                tracing::info!(encoder = %name, "Hardware encoder detected");
                name
            }
            None => {
                tracing::info!(
                    encoder = software_encoder,
                    "No hardware encoder detected; using software encoder"
                );
                software_encoder.to_string()
            }
        };

        Self { decoder, encoder }
    }
}

async fn query(ffmpeg: &Path, flag: &str) -> Option<String> {
    match ToolCommand::new(ffmpeg.to_path_buf())
        .args(["-hide_banner", flag])
        .execute()
        .await
    {
        Ok(output) => Some(output.stdout_text()),
        Err(e) => {
            tracing::warn!(flag, error = %e, "Unable to query ffmpeg capabilities");
            None
        }
    }
}

/// First preferred decoder listed in `ffmpeg -hwaccels` output.
///
/// The listing has one method name per line after a header line.
pub fn pick_decoder(listing: &str) -> Option<String> {
    let offered: Vec<&str> = listing.lines().map(str::trim).collect();
    HW_DECODERS
        .iter()
        .find(|name| offered.contains(name))
        .map(|name| name.to_string())
}

/// First preferred encoder listed in `ffmpeg -encoders` output.
///
/// Each encoder line is `<flags> <name> <description>`; only the name column
/// is compared.
pub fn pick_encoder(listing: &str) -> Option<String> {
    let offered: Vec<&str> = listing
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .collect();
    HW_ENCODERS
        .iter()
        .find(|name| offered.contains(name))
        .map(|name| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtt_core::config::ToolsConfig;

    const HWACCELS: &str = "Hardware acceleration methods:\nvdpau\ncuda\nvaapi\nqsv\n";

    const ENCODERS: &str = "\
Encoders:
 V..... = Video
 ------
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC
 V....D h264_qsv             H.264 / AVC / MPEG-4 AVC (Intel Quick Sync Video acceleration)
 V....D h264_nvenc           NVIDIA NVENC H.264 encoder
 A....D aac                  AAC (Advanced Audio Coding)
";

    #[test]
    fn discover_with_default_config() {
        let cfg = ToolsConfig::default();
        let registry = ToolRegistry::discover(&cfg);
        // Tools may or may not be installed; either way a program is named.
        assert!(registry.program("ffmpeg").ends_with("ffmpeg"));
    }

    #[test]
    fn missing_tool_falls_back_to_bare_name() {
        let registry = ToolRegistry::default();
        assert_eq!(registry.program("ffmpeg"), PathBuf::from("ffmpeg"));
    }

    #[test]
    fn configured_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("my-ffprobe");
        std::fs::write(&fake, "").unwrap();
        let cfg = ToolsConfig {
            ffmpeg_path: None,
            ffprobe_path: Some(fake.clone()),
        };
        let registry = ToolRegistry::discover(&cfg);
        assert_eq!(registry.program("ffprobe"), fake);
    }

    #[tokio::test]
    async fn check_all_returns_known_tools() {
        let registry = ToolRegistry::default();
        let infos = registry.check_all().await;
        let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["ffmpeg", "ffprobe"]);
        assert!(infos.iter().all(|i| !i.available));
    }

    #[test]
    fn decoder_preference_order() {
        // cuda is listed before qsv in preference, regardless of output order.
        assert_eq!(pick_decoder(HWACCELS), Some("cuda".to_string()));
        assert_eq!(
            pick_decoder("Hardware acceleration methods:\nqsv\nvideotoolbox\n"),
            Some("videotoolbox".to_string())
        );
    }

    #[test]
    fn decoder_none_when_unlisted() {
        assert_eq!(pick_decoder("Hardware acceleration methods:\nvdpau\n"), None);
        assert_eq!(pick_decoder(""), None);
    }

    #[test]
    fn decoder_ignores_substring_matches() {
        // "cuda" appears inside another token but not as its own line.
        assert_eq!(pick_decoder("Hardware acceleration methods:\ncudafoo\n"), None);
    }

    #[test]
    fn encoder_preference_order() {
        assert_eq!(pick_encoder(ENCODERS), Some("h264_nvenc".to_string()));
    }

    #[test]
    fn encoder_only_matches_name_column() {
        let listing = " V....D libx264   mentions h264_nvenc in the description\n";
        assert_eq!(pick_encoder(listing), None);
    }

    #[tokio::test]
    async fn detect_without_ffmpeg_is_software() {
        let profile =
            EncoderProfile::detect(Path::new("/nonexistent/ffmpeg_xyz"), "h264").await;
        assert_eq!(profile, EncoderProfile::software("h264"));
    }
}
