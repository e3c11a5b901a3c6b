//! Domain data types

pub mod details;
pub mod student;

pub use details::{CourseDetail, CourseStudentCount, IntegratedDetail, StudentDetail};
pub use student::{ApplicationStatus, CourseStatus, Student, StudentCourse};
