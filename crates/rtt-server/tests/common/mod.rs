//! Shared test harness for HTTP-level tests.
//!
//! Provides [`TestHarness`], which writes small shell scripts standing in for
//! ffmpeg and ffprobe, builds a full [`AppContext`] around them, and serves
//! it on a random port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rtt_av::EncoderProfile;
use rtt_core::config::Config;
use rtt_core::PlanningStrategy;
use rtt_server::context::AppContext;
use tokio_util::sync::CancellationToken;

/// ffprobe output for a 12.3 s video with one audio stream.
pub const PROBE_12_3_WITH_AUDIO: &str = concat!(
    r#"{"streams":["#,
    r#"{"index":0,"codec_type":"video","time_base":"1/1000","duration":"12.300000"},"#,
    r#"{"index":1,"codec_type":"audio","time_base":"1/48000","duration":"12.288000"}],"#,
    r#""format":{"duration":"12.320000"}}"#,
);

/// ffprobe keyframe output (time base 1/1000): 0, 4.171, 10.0.
pub const KEYFRAMES_12_3: &str = r#"{"frames":[{"pts":0},{"pts":4171},{"pts":10000}]}"#;

/// What the fake tools do.
pub struct Setup {
    pub strategy: PlanningStrategy,
    pub max_concurrent: usize,
    /// Body of the fake ffprobe; `None` points at a missing binary.
    pub ffprobe: Option<String>,
    /// Body of the fake ffmpeg; `None` points at a missing binary.
    pub ffmpeg: Option<String>,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            strategy: PlanningStrategy::Fixed,
            max_concurrent: 10,
            ffprobe: Some(ffprobe_script(PROBE_12_3_WITH_AUDIO, KEYFRAMES_12_3)),
            ffmpeg: Some(ffmpeg_script("printf 'TSDATA'")),
        }
    }
}

/// ffprobe stand-in answering probe and keyframe invocations. Each run
/// appends a line to `$TOOLS/ffprobe.calls`.
pub fn ffprobe_script(probe_json: &str, keyframes_json: &str) -> String {
    format!(
        "echo run >> \"$(dirname \"$0\")/ffprobe.calls\"\n\
         case \"$*\" in\n\
         \x20 *skip_frame*) echo '{keyframes_json}' ;;\n\
         \x20 *) echo '{probe_json}' ;;\n\
         esac"
    )
}

/// ffmpeg stand-in that records its arguments to `$TOOLS/ffmpeg.args` and
/// then runs `tail`.
pub fn ffmpeg_script(tail: &str) -> String {
    format!("printf '%s\\n' \"$@\" > \"$(dirname \"$0\")/ffmpeg.args\"\n{tail}")
}

/// ffmpeg stand-in that blocks until `$TOOLS/release` exists.
pub fn blocking_ffmpeg() -> String {
    ffmpeg_script(
        "while [ ! -f \"$(dirname \"$0\")/release\" ]; do sleep 0.02; done\nprintf 'TSDATA'",
    )
}

pub struct TestHarness {
    pub ctx: AppContext,
    pub addr: SocketAddr,
    /// Video root directory.
    pub root: tempfile::TempDir,
    /// Directory holding the fake tools.
    pub tools: tempfile::TempDir,
    cancel: CancellationToken,
}

impl TestHarness {
    /// Default setup: fixed planning, cap 10, working tools.
    pub async fn start() -> Self {
        Self::with_setup(Setup::default()).await
    }

    pub async fn with_setup(setup: Setup) -> Self {
        let root = tempfile::tempdir().expect("failed to create root dir");
        let tools = tempfile::tempdir().expect("failed to create tools dir");

        let ffprobe = match setup.ffprobe {
            Some(body) => write_script(tools.path(), "ffprobe", &body),
            None => tools.path().join("missing-ffprobe"),
        };
        let ffmpeg = match setup.ffmpeg {
            Some(body) => write_script(tools.path(), "ffmpeg", &body),
            None => tools.path().join("missing-ffmpeg"),
        };

        let mut config = Config::default();
        config.segment.strategy = setup.strategy;
        config.transcode.max_concurrent = setup.max_concurrent;
        config.transcode.hw_accel = "none".into();

        let ctx = AppContext::new(
            config,
            root.path(),
            ffmpeg,
            ffprobe,
            EncoderProfile::software("h264"),
        )
        .expect("failed to build context");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        let cancel = CancellationToken::new();
        tokio::spawn(rtt_server::serve(listener, ctx.clone(), cancel.clone()));

        Self {
            ctx,
            addr,
            root,
            tools,
            cancel,
        }
    }

    /// Create a (content-free) video file under the root.
    pub fn add_video(&self, relative: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, b"not really a video").unwrap();
        path
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    pub async fn get(&self, path_and_query: &str) -> reqwest::Response {
        reqwest::get(self.url(path_and_query))
            .await
            .expect("request failed")
    }

    /// Arguments of the last fake ffmpeg run, if it ran.
    pub fn ffmpeg_args(&self) -> Option<Vec<String>> {
        std::fs::read_to_string(self.tools.path().join("ffmpeg.args"))
            .ok()
            .map(|s| s.lines().map(String::from).collect())
    }

    /// How many times the fake ffprobe has run.
    pub fn ffprobe_calls(&self) -> usize {
        std::fs::read_to_string(self.tools.path().join("ffprobe.calls"))
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    /// Let every blocked fake ffmpeg finish.
    pub fn release_ffmpeg(&self) {
        std::fs::write(self.tools.path().join("release"), b"").unwrap();
    }

    /// Wait until exactly `n` transcodes hold admission permits.
    pub async fn wait_in_flight(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(10), async {
            while self.ctx.admission.in_flight() != n {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| {
            panic!(
                "expected {n} in flight, found {}",
                self.ctx.admission.in_flight()
            )
        });
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
