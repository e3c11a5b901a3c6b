//! Request handlers

pub mod courses;
pub mod health;
pub mod students;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Acknowledgment body for update endpoints.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub message: &'static str,
}

/// Empty list results are "no content" at the transport layer, not errors.
fn list_response<T: Serialize>(items: Vec<T>) -> Response {
    if items.is_empty() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Json(items).into_response()
    }
}
