//! Route table

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{courses, health, students};
use crate::state::AppState;

/// Build the application router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/students",
            get(students::get_student_list)
                .post(students::register_student)
                .put(students::update_student),
        )
        .route("/students/search", get(students::search_students))
        .route("/students/{id}", get(students::get_student))
        .route("/students/{id}/courses", get(students::get_student_courses))
        .route("/courses", get(courses::get_all_courses))
        .route("/courses/counts", get(courses::get_course_counts))
        .route("/courses/status", put(courses::update_course_status))
        .route("/courses/{id}", get(courses::get_course))
        .with_state(state)
}
