//! `GET /` and every unrouted path.

use axum::http::StatusCode;
use axum::response::IntoResponse;

/// GET /
pub async fn root() -> impl IntoResponse {
    not_found().await
}

/// Fallback for paths with no route.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "404 Not Found.")
}
