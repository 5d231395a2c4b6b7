//! # rtt-av
//!
//! External tool management and invocation for the rttstream pipeline.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache paths to ffmpeg
//!   and ffprobe.
//! - **Capability probe** ([`EncoderProfile`]) -- one-time detection of
//!   hardware decoders/encoders.
//! - **Command execution** ([`ToolCommand`]) -- async builder with optional
//!   timeout and kill-on-drop for running external processes.
//! - **Probing** ([`MediaProber`], [`KeyframeExtractor`]) -- duration, audio
//!   presence, time base, and keyframe timestamps via ffprobe.
//! - **Transcoding** ([`TranscodeWorker`]) -- one ffmpeg invocation per
//!   segment window, producing an MPEG-TS buffer.
//! - **Sidecar subtitles** ([`find_sidecar_subtitle`]) -- best-effort lookup.

pub mod command;
pub mod keyframes;
pub mod probe;
pub mod subtitle;
pub mod tools;
pub mod transcode;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolFailure, ToolOutput};
pub use keyframes::KeyframeExtractor;
pub use probe::MediaProber;
pub use subtitle::find_sidecar_subtitle;
pub use tools::{EncoderProfile, ToolConfig, ToolInfo, ToolRegistry};
pub use transcode::{build_args, TranscodeRequest, TranscodeSettings, TranscodeWorker};
