//! Axum router construction.
//!
//! Builds the application router with the two video routes, the 404 root,
//! and the request-id, CORS and tracing layers.

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

/// Path of the playlist route.
pub const PLAYLIST_PATH: &str = "/video/rttPlaylist";

/// Path of the segment route.
pub const SEGMENT_PATH: &str = rtt_media::hls::SEGMENT_ROUTE;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::root::root))
        .route(PLAYLIST_PATH, get(routes::playlist::playlist))
        .route(SEGMENT_PATH, get(routes::segment::segment))
        .fallback(routes::root::not_found)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
