//! `GET /video/rttSegment?path=..&audio=<0|1>&segment=<i>` (fixed mode) or
//! `..&start=<secs>&duration=<secs>` (keyframe mode).

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use serde::Deserialize;

use rtt_av::TranscodeRequest;
use rtt_core::{Error, PlanningStrategy, Result, SegmentWindow, Timestamp};

use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::request_id::RequestId;

/// MIME type of MPEG transport stream segments.
pub const SEGMENT_CONTENT_TYPE: &str = "video/MP2T";

/// Raw query parameters; numeric values are validated by hand so that
/// malformed input yields a 400 with the usual error body.
#[derive(Debug, Default, Deserialize)]
pub struct SegmentParams {
    pub path: Option<String>,
    pub audio: Option<String>,
    pub segment: Option<String>,
    pub start: Option<String>,
    pub duration: Option<String>,
}

/// How the requested window is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentAddress {
    Index(usize),
    Window { start: Timestamp, duration: Timestamp },
}

/// Validated segment request, before touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentQuery {
    pub path: String,
    pub has_audio: bool,
    pub address: SegmentAddress,
}

impl SegmentQuery {
    /// Validate `params` for the active `strategy`.
    pub fn parse(params: SegmentParams, strategy: PlanningStrategy) -> Result<Self> {
        let path = params
            .path
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::Validation("missing required parameter: path".into()))?;

        let has_audio = match params.audio.as_deref() {
            None | Some("0") => false,
            Some("1") => true,
            Some(other) => {
                return Err(Error::Validation(format!(
                    "invalid audio flag '{other}' (expected 0 or 1)"
                )))
            }
        };

        let address = match strategy {
            PlanningStrategy::Fixed => {
                let raw = required(params.segment.as_deref(), "segment")?;
                let index = raw.trim().parse::<usize>().map_err(|_| {
                    Error::Validation(format!("invalid segment index '{raw}'"))
                })?;
                SegmentAddress::Index(index)
            }
            PlanningStrategy::Keyframe => {
                let start = parse_secs(required(params.start.as_deref(), "start")?, "start")?;
                let duration =
                    parse_secs(required(params.duration.as_deref(), "duration")?, "duration")?;
                if duration == Timestamp::ZERO {
                    return Err(Error::Validation("duration must be positive".into()));
                }
                SegmentAddress::Window { start, duration }
            }
        };

        Ok(Self {
            path,
            has_audio,
            address,
        })
    }
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Validation(format!("missing required parameter: {name}")))
}

fn parse_secs(raw: &str, name: &str) -> Result<Timestamp> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(Timestamp::from_secs_round)
        .ok_or_else(|| Error::Validation(format!("invalid {name} '{raw}'")))
}

/// GET /video/rttSegment
///
/// Transcodes one window and returns it as a complete MPEG-TS body.
pub async fn segment(
    State(ctx): State<AppContext>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Query(params): Query<SegmentParams>,
) -> std::result::Result<Response, AppError> {
    transcode_segment(&ctx, params)
        .await
        .map(|bytes| {
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, SEGMENT_CONTENT_TYPE.to_string()),
                    (header::CONTENT_LENGTH, bytes.len().to_string()),
                ],
                bytes,
            )
                .into_response()
        })
        .map_err(|e| AppError::new(e).with_request_id(request_id).for_segment())
}

async fn transcode_segment(ctx: &AppContext, params: SegmentParams) -> Result<Vec<u8>> {
    let query = SegmentQuery::parse(params, ctx.config.segment.strategy)?;
    let resolved = ctx.resolver.resolve_file(&query.path).await?;

    // Held until the transcode future completes or is dropped. Taken before
    // any probing so a full gate answers without spawning anything.
    let _permit = ctx.admission.try_acquire()?;

    let window = match query.address {
        SegmentAddress::Index(index) => {
            let mut asset = ctx.prober.probe(&resolved).await?;
            let plan = super::plan_for(ctx, &mut asset).await?;
            *plan.window(index).ok_or_else(|| {
                Error::Validation(format!(
                    "segment index {index} out of range (plan has {})",
                    plan.len()
                ))
            })?
        }
        SegmentAddress::Window { start, duration } => SegmentWindow {
            index: 0,
            start,
            duration,
        },
    };

    let request = TranscodeRequest {
        path: resolved,
        window,
        has_audio: query.has_audio,
    };
    ctx.transcoder.run(&request).await
}
