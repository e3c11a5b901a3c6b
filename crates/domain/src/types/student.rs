//! Entity types persisted by the store
//!
//! Ids are integer surrogate keys assigned by the store; `None` means the
//! entity has not been persisted yet.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, StudyHallError};

/// A person enrolled in the system.
///
/// Deletion is logical only: flipping `is_deleted` marks the student inactive
/// without removing the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Option<i64>,
    pub name: String,
    /// Phonetic reading of the name
    pub furigana: String,
    pub nickname: String,
    pub email: String,
    pub city: String,
    pub age: i32,
    pub gender: String,
    pub remark: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Student {
    /// Check the field-level invariants of an incoming student payload.
    ///
    /// `remark` may be absent but must not be whitespace-only when present.
    pub fn validate(&self) -> Result<()> {
        require_non_blank("name", &self.name)?;
        require_non_blank("furigana", &self.furigana)?;
        require_non_blank("nickname", &self.nickname)?;
        require_non_blank("email", &self.email)?;
        if !self.email.contains('@') {
            return Err(StudyHallError::InvalidInput("email must contain '@'".into()));
        }
        require_non_blank("city", &self.city)?;
        require_non_blank("gender", &self.gender)?;
        if self.age < 0 {
            return Err(StudyHallError::InvalidInput("age must not be negative".into()));
        }
        if let Some(remark) = &self.remark {
            if remark.trim().is_empty() {
                return Err(StudyHallError::InvalidInput(
                    "remark must not be whitespace-only".into(),
                ));
            }
        }
        Ok(())
    }
}

/// One course enrollment record belonging to a student.
///
/// `student_id`, `start_date` and `end_date` are server-assigned during
/// registration; clients never supply them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentCourse {
    pub id: Option<i64>,
    pub student_id: Option<i64>,
    pub course_name: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl StudentCourse {
    /// Check the field-level invariants of an incoming course payload.
    pub fn validate(&self) -> Result<()> {
        require_non_blank("course_name", &self.course_name)
    }
}

/// The application/progress state of a single enrollment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseStatus {
    pub id: Option<i64>,
    pub course_id: i64,
    pub status: ApplicationStatus,
}

/// Fixed ordered application-state progression for an enrollment.
///
/// The nominal progression is linear, but transitions are not enforced:
/// any state may be written over any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    ProvisionalApplication,
    FormalApplication,
    InProgress,
    Completed,
}

impl ApplicationStatus {
    /// Wire representation, also used as the stored column value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProvisionalApplication => "PROVISIONAL_APPLICATION",
            Self::FormalApplication => "FORMAL_APPLICATION",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = StudyHallError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "PROVISIONAL_APPLICATION" => Ok(Self::ProvisionalApplication),
            "FORMAL_APPLICATION" => Ok(Self::FormalApplication),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(StudyHallError::InvalidInput(format!(
                "unknown application status: {other}"
            ))),
        }
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StudyHallError::InvalidInput(format!("{field} must not be blank")));
    }
    Ok(())
}
