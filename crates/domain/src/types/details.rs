//! Composite view types assembled by the service layer
//!
//! These aggregates are transient: they live for the duration of a single
//! request and are never persisted.

use serde::{Deserialize, Serialize};

use super::student::{CourseStatus, Student, StudentCourse};
use crate::errors::Result;

/// One student together with the ordered list of their enrollments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDetail {
    pub student: Student,
    #[serde(default)]
    pub courses: Vec<StudentCourse>,
}

impl StudentDetail {
    /// Validate the student payload and every course payload it carries.
    pub fn validate(&self) -> Result<()> {
        self.student.validate()?;
        for course in &self.courses {
            course.validate()?;
        }
        Ok(())
    }
}

/// One enrollment together with its matched application status.
///
/// `status` is `None` when no status row matched the course; callers that
/// require a status treat absence as a not-found condition themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDetail {
    pub course: StudentCourse,
    pub status: Option<CourseStatus>,
}

/// The fully joined view: a [`StudentDetail`] plus its [`CourseDetail`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratedDetail {
    pub student_detail: StudentDetail,
    pub course_details: Vec<CourseDetail>,
}

/// Number of enrollments per course name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseStudentCount {
    pub course_name: String,
    pub student_count: i64,
}
