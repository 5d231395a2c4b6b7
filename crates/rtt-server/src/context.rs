//! Application context shared by all route handlers via Axum state.
//!
//! [`AppContext`] is built once at startup. Everything in it is immutable
//! except the admission gate, whose state is internally synchronized.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rtt_av::{EncoderProfile, KeyframeExtractor, MediaProber, ToolRegistry};
use rtt_av::{TranscodeSettings, TranscodeWorker};
use rtt_core::config::Config;
use rtt_core::Result;

use crate::admission::AdmissionController;
use crate::paths::PathResolver;

/// Central application context, cheap to clone.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub resolver: Arc<PathResolver>,
    pub prober: Arc<MediaProber>,
    pub keyframes: Arc<KeyframeExtractor>,
    pub transcoder: Arc<TranscodeWorker>,
    pub admission: AdmissionController,
}

impl AppContext {
    /// Wire the context from explicit tool paths and encoder profile.
    ///
    /// `root` must be an existing directory.
    pub fn new(
        config: Config,
        root: &Path,
        ffmpeg: PathBuf,
        ffprobe: PathBuf,
        profile: EncoderProfile,
    ) -> Result<Self> {
        let resolver = PathResolver::new(root)?;
        let timeout = config.transcode.timeout_secs.map(Duration::from_secs);

        let prober = MediaProber::new(ffprobe.clone()).with_timeout(timeout);
        let keyframes = KeyframeExtractor::new(ffprobe).with_timeout(timeout);
        let settings = TranscodeSettings::from_config(&config.transcode, profile);
        let transcoder = TranscodeWorker::new(ffmpeg, settings);
        let admission = AdmissionController::new(config.transcode.max_concurrent);

        Ok(Self {
            config: Arc::new(config),
            resolver: Arc::new(resolver),
            prober: Arc::new(prober),
            keyframes: Arc::new(keyframes),
            transcoder: Arc::new(transcoder),
            admission,
        })
    }

    /// Discover ffmpeg/ffprobe, detect hardware support, and wire the
    /// context. Hardware detection is skipped when `transcode.hw_accel` is
    /// `"none"`.
    pub async fn discover(config: Config, root: &Path) -> Result<Self> {
        let tools = ToolRegistry::discover(&config.tools);
        for info in tools.check_all().await {
            if info.available {
                tracing::info!(
                    "Tool found: {} ({})",
                    info.name,
                    info.version.as_deref().unwrap_or("unknown version")
                );
            } else {
                tracing::warn!("Tool not found: {}", info.name);
            }
        }

        let ffmpeg = tools.program("ffmpeg");
        let ffprobe = tools.program("ffprobe");

        let software = config.transcode.software_encoder.clone();
        let profile = if config.transcode.hw_accel == "none" {
            tracing::info!(encoder = %software, "Hardware acceleration disabled");
            EncoderProfile::software(software)
        } else {
            EncoderProfile::detect(&ffmpeg, &software).await
        };

        Self::new(config, root, ffmpeg, ffprobe, profile)
    }

    /// Segment length in seconds for fixed planning.
    pub fn segment_length_secs(&self) -> u32 {
        self.config.segment.effective_length_secs()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("root", &self.resolver.root())
            .field("strategy", &self.config.segment.strategy)
            .field("max_concurrent", &self.admission.limit())
            .finish_non_exhaustive()
    }
}
