//! Student endpoints

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use studyhall_core::StudentSearchConditions;
use studyhall_domain::{ApplicationStatus, CourseDetail, IntegratedDetail, StudentDetail};

use super::{list_response, Ack};
use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the student list.
#[derive(Debug, Deserialize)]
pub struct StudentListQuery {
    /// When present, restrict the list to (un)deleted students.
    pub deleted: Option<bool>,
}

/// Query parameters for the integrated detail search.
#[derive(Debug, Deserialize)]
pub struct IntegratedSearchQuery {
    pub name: Option<String>,
    pub furigana: Option<String>,
    pub city: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub course_name: Option<String>,
    pub status: Option<ApplicationStatus>,
}

/// `GET /students`
pub async fn get_student_list(
    State(state): State<AppState>,
    Query(query): Query<StudentListQuery>,
) -> Result<Response, ApiError> {
    let details = state.service.search_student_list(query.deleted).await?;
    Ok(list_response(details))
}

/// `GET /students/{id}`
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StudentDetail>, ApiError> {
    let detail = state.service.search_student(id).await?;
    Ok(Json(detail))
}

/// `GET /students/{id}/courses`
///
/// Strict variant: every course of the student must resolve a status.
pub async fn get_student_courses(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<CourseDetail>>, ApiError> {
    let details = state.service.search_student_courses(id).await?;
    Ok(Json(details))
}

/// `GET /students/search`
pub async fn search_students(
    State(state): State<AppState>,
    Query(query): Query<IntegratedSearchQuery>,
) -> Result<Response, ApiError> {
    let conditions = StudentSearchConditions {
        name: query.name,
        furigana: query.furigana,
        city: query.city,
        age: query.age,
        gender: query.gender,
        course_name: query.course_name,
        status: query.status,
    };
    let details = state.service.search_integrated_details(conditions).await?;
    Ok(list_response(details))
}

/// `POST /students`
pub async fn register_student(
    State(state): State<AppState>,
    Json(detail): Json<StudentDetail>,
) -> Result<Json<IntegratedDetail>, ApiError> {
    detail.validate()?;
    let integrated = state.service.register_student(detail).await?;
    Ok(Json(integrated))
}

/// `PUT /students`
///
/// Logical deletion and undeletion travel through this endpoint via the
/// payload's `is_deleted` flag.
pub async fn update_student(
    State(state): State<AppState>,
    Json(detail): Json<StudentDetail>,
) -> Result<Json<Ack>, ApiError> {
    detail.validate()?;
    state.service.update_student(detail).await?;
    Ok(Json(Ack { message: "student updated" }))
}
