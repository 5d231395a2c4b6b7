//! `GET /video/rttPlaylist?path=<relative path>`

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use serde::Deserialize;

use rtt_av::find_sidecar_subtitle;
use rtt_core::Error;
use rtt_media::{generate_media_playlist, MediaPlaylist, SegmentUriBuilder};

use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::request_id::RequestId;

/// MIME type of HLS playlists.
pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

#[derive(Debug, Deserialize)]
pub struct PlaylistParams {
    pub path: Option<String>,
}

/// GET /video/rttPlaylist
///
/// Probes the video, plans its segments and returns the media playlist.
pub async fn playlist(
    State(ctx): State<AppContext>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Query(params): Query<PlaylistParams>,
) -> Result<impl IntoResponse, AppError> {
    build_playlist(&ctx, params)
        .await
        .map(|body| (StatusCode::OK, [(header::CONTENT_TYPE, PLAYLIST_CONTENT_TYPE)], body))
        .map_err(|e| AppError::new(e).with_request_id(request_id))
}

async fn build_playlist(ctx: &AppContext, params: PlaylistParams) -> rtt_core::Result<String> {
    let path = params
        .path
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::Validation("missing required parameter: path".into()))?;

    let resolved = ctx.resolver.resolve_file(&path).await?;

    let mut asset = ctx.prober.probe(&resolved).await?;
    let plan = super::plan_for(ctx, &mut asset).await?;

    let uris = SegmentUriBuilder::new(&path, asset.has_audio);
    let body = generate_media_playlist(&MediaPlaylist::from_plan(&plan, &uris));

    tracing::info!(
        path = %path,
        duration = %asset.duration,
        strategy = %plan.strategy,
        segments = plan.len(),
        keyframes = ?asset.keyframes.as_ref().map(Vec::len),
        "Playlist generated"
    );

    match find_sidecar_subtitle(&resolved).await {
        Some(subtitle) => {
            tracing::info!(subtitle = %subtitle.display(), "Sidecar subtitle found")
        }
        None => tracing::debug!(path = %path, "No sidecar subtitle"),
    }

    Ok(body)
}
