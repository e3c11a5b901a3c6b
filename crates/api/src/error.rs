//! Transport-level error mapping
//!
//! The core produces domain error kinds only; this module is the single
//! place they become HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use studyhall_domain::StudyHallError;
use tracing::error;

/// Wrapper turning a domain error into an HTTP response.
#[derive(Debug)]
pub struct ApiError(StudyHallError);

impl From<StudyHallError> for ApiError {
    fn from(err: StudyHallError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StudyHallError::NotFound(_) => StatusCode::NOT_FOUND,
            StudyHallError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "request failed");
        }
        (status, Json(&self.0)).into_response()
    }
}
