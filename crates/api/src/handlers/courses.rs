//! Course and application-status endpoints

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use studyhall_domain::{CourseDetail, CourseStatus};

use super::{list_response, Ack};
use crate::error::ApiError;
use crate::state::AppState;

/// `GET /courses`
///
/// Lenient listing: courses without a status row are returned with the
/// status absent.
pub async fn get_all_courses(State(state): State<AppState>) -> Result<Response, ApiError> {
    let details = state.service.get_all_courses().await?;
    Ok(list_response(details))
}

/// `GET /courses/counts`
pub async fn get_course_counts(State(state): State<AppState>) -> Result<Response, ApiError> {
    let counts = state.service.count_students_by_course().await?;
    Ok(list_response(counts))
}

/// `GET /courses/{id}`
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CourseDetail>, ApiError> {
    let detail = state.service.get_course_by_id(id).await?;
    Ok(Json(detail))
}

/// `PUT /courses/status`
pub async fn update_course_status(
    State(state): State<AppState>,
    Json(status): Json<CourseStatus>,
) -> Result<Json<Ack>, ApiError> {
    state.service.update_course_status(status).await?;
    Ok(Json(Ack { message: "course status updated" }))
}
