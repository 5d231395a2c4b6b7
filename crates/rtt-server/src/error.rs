//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`rtt_core::Error`] so that route handlers
//! can return `Result<T, AppError>` and use `?` on library calls.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: rtt_core::Error,
    request_id: Option<String>,
    /// Report every failure except validation as this status.
    collapse_to: Option<StatusCode>,
}

impl AppError {
    pub fn new(inner: rtt_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
            collapse_to: None,
        }
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }

    /// Segment requests answer 400 for bad parameters and 500 for
    /// everything else.
    pub fn for_segment(mut self) -> Self {
        self.collapse_to = Some(StatusCode::INTERNAL_SERVER_ERROR);
        self
    }

    pub fn status(&self) -> StatusCode {
        match (&self.inner, self.collapse_to) {
            (rtt_core::Error::Validation(_), _) | (_, None) => {
                StatusCode::from_u16(self.inner.http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            (_, Some(status)) => status,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                request_id = self.request_id.as_deref().unwrap_or("-"),
                "Server error in request handler"
            );
        } else {
            tracing::info!(
                status = %status,
                error = %self.inner,
                request_id = self.request_id.as_deref().unwrap_or("-"),
                "Request rejected"
            );
        }

        let body = json!({
            "error": self.inner.public_message(),
            "code": self.inner.code(),
            "request_id": self.request_id,
        });

        let mut response = (status, axum::Json(body)).into_response();
        if self.inner.is_retryable() {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtt_core::Error;
    use std::path::PathBuf;

    #[test]
    fn not_found_produces_404() {
        let err = AppError::new(Error::not_found("video", "a.mkv"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn traversal_produces_403() {
        let err = AppError::new(Error::PathTraversal {
            path: PathBuf::from("/etc/passwd"),
        });
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn segment_collapses_to_500() {
        let err = AppError::new(Error::PathTraversal {
            path: PathBuf::from("/etc/passwd"),
        })
        .for_segment();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn segment_keeps_validation_400() {
        let err = AppError::new(Error::Validation("bad start".into())).for_segment();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn capacity_sets_retry_after() {
        let response = AppError::new(Error::CapacityExceeded { limit: 10 })
            .for_segment()
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "1");
    }

    #[test]
    fn with_request_id() {
        let err = AppError::new(Error::Internal("oops".into())).with_request_id("req-123".into());
        assert_eq!(err.request_id.as_deref(), Some("req-123"));
    }
}
