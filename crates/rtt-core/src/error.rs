//! Unified error type for rttstream.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for request handlers to derive an HTTP status code via [`Error::http_status`]
//! and a client-safe message via [`Error::public_message`].

use std::path::PathBuf;
use std::process::ExitStatus;

/// Unified error type covering every failure mode of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A query parameter is missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The canonical path escapes the configured root directory.
    #[error("Path escapes root directory: {}", path.display())]
    PathTraversal {
        /// The canonicalized path that was rejected.
        path: PathBuf,
    },

    /// The client path could not be canonicalized (missing component,
    /// permission denied, ...).
    #[error("Failed to resolve path {}: {source}", path.display())]
    PathResolution {
        /// The joined, not yet canonicalized path.
        path: PathBuf,
        /// The underlying filesystem error.
        source: std::io::Error,
    },

    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "video", "segment").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The probing tool could not be launched or exited non-zero.
    #[error("Probe execution failed: {0}")]
    ProbeExecution(String),

    /// The probing tool produced output that is not well-formed.
    #[error("Probe output parse error: {0}")]
    ProbeParse(String),

    /// Neither the video stream nor the container reports a duration.
    #[error("Video duration unavailable")]
    DurationUnavailable,

    /// Keyframe timestamps could not be extracted.
    #[error("Keyframe extraction failed: {0}")]
    KeyframeExtraction(String),

    /// The admission gate is full.
    #[error("Transcoder capacity exceeded ({limit} in flight)")]
    CapacityExceeded {
        /// Configured concurrency cap.
        limit: usize,
    },

    /// The transcoder process could not be started.
    #[error("Failed to launch transcoder: {0}")]
    TranscodeLaunch(String),

    /// The transcoder exited with a non-zero status.
    #[error("Transcoder exited with {status}: {stderr}")]
    TranscodeFailed {
        /// Exit status of the process.
        status: ExitStatus,
        /// Captured diagnostic output.
        stderr: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::PathTraversal { .. } => 403,
            Error::PathResolution { source, .. } => {
                if source.kind() == std::io::ErrorKind::NotFound {
                    404
                } else {
                    403
                }
            }
            Error::NotFound { .. } => 404,
            Error::ProbeExecution(_)
            | Error::ProbeParse(_)
            | Error::DurationUnavailable
            | Error::KeyframeExtraction(_) => 403,
            Error::CapacityExceeded { .. } => 500,
            Error::TranscodeLaunch(_) => 500,
            Error::TranscodeFailed { .. } => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation_error",
            Error::PathTraversal { .. } => "path_traversal",
            Error::PathResolution { .. } => "path_resolution",
            Error::NotFound { .. } => "not_found",
            Error::ProbeExecution(_) => "probe_execution",
            Error::ProbeParse(_) => "probe_parse",
            Error::DurationUnavailable => "duration_unavailable",
            Error::KeyframeExtraction(_) => "keyframe_extraction",
            Error::CapacityExceeded { .. } => "capacity_exceeded",
            Error::TranscodeLaunch(_) => "transcode_launch",
            Error::TranscodeFailed { .. } => "transcode_failed",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Whether the client may simply retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::CapacityExceeded { .. })
    }

    /// Message safe to show to clients. Tool diagnostics and filesystem
    /// details stay in the server log.
    pub fn public_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::PathTraversal { .. } => "Illegal path access".into(),
            Error::PathResolution { .. } => "Path could not be resolved".into(),
            Error::NotFound { entity, .. } => format!("{entity} not found"),
            Error::ProbeExecution(_)
            | Error::ProbeParse(_)
            | Error::DurationUnavailable
            | Error::KeyframeExtraction(_) => {
                "Unable to read video information, see server log".into()
            }
            Error::CapacityExceeded { .. } => {
                "Transcoding capacity is full, please retry later".into()
            }
            Error::TranscodeLaunch(_) | Error::TranscodeFailed { .. } => {
                "Transcoding failed, see server log".into()
            }
            Error::Io { .. } | Error::Internal(_) => "Internal server error".into(),
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
