//! Port interfaces for student and course persistence
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations. Reads live on the repository
//! itself; writes go through a unit of work so that multi-statement
//! mutations commit or roll back as one.

use async_trait::async_trait;
use studyhall_domain::{
    ApplicationStatus, CourseStatus, CourseStudentCount, Result, Student, StudentCourse,
};

/// Optional AND-combined filters for the integrated detail search.
///
/// An absent field places no constraint. String filters match as
/// substrings; `age`, `gender` and `status` match exactly.
#[derive(Debug, Default, Clone)]
pub struct StudentSearchConditions {
    pub name: Option<String>,
    pub furigana: Option<String>,
    pub city: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub course_name: Option<String>,
    pub status: Option<ApplicationStatus>,
}

/// Trait for reading and writing students, enrollments and statuses
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Fetch every student, deleted or not. The logical-delete filter is
    /// applied by the service, not by this query.
    async fn search_students(&self) -> Result<Vec<Student>>;

    /// Fetch a single student by id, or `None` when the row is absent.
    async fn search_student(&self, id: i64) -> Result<Option<Student>>;

    /// Fetch every enrollment row.
    async fn search_student_course_list(&self) -> Result<Vec<StudentCourse>>;

    /// Fetch the enrollments belonging to one student.
    async fn search_student_courses_by_student_id(
        &self,
        student_id: i64,
    ) -> Result<Vec<StudentCourse>>;

    /// Fetch the enrollments with the given course id.
    async fn search_courses_by_course_id(&self, course_id: i64) -> Result<Vec<StudentCourse>>;

    /// Fetch the status attached to one course, or `None` when absent.
    async fn search_course_status(&self, course_id: i64) -> Result<Option<CourseStatus>>;

    /// Fetch every status row.
    async fn search_course_status_list(&self) -> Result<Vec<CourseStatus>>;

    /// Fetch students matching the student-side conditions (name, furigana,
    /// city, age, gender). Course-side fields of `conditions` are ignored.
    async fn find_students_by_conditions(
        &self,
        conditions: &StudentSearchConditions,
    ) -> Result<Vec<Student>>;

    /// Fetch enrollments whose course name contains `course_name`;
    /// all of them when `None`.
    async fn find_courses_by_conditions(
        &self,
        course_name: Option<&str>,
    ) -> Result<Vec<StudentCourse>>;

    /// Fetch statuses with the given state; all of them when `None`.
    async fn find_course_status_by_conditions(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<CourseStatus>>;

    /// Count enrollments grouped by course name.
    async fn count_students_by_course(&self) -> Result<Vec<CourseStudentCount>>;

    /// Open a unit of work. Writes made through it become visible only
    /// after [`StudentUnitOfWork::commit`]; dropping it uncommitted
    /// discards them.
    fn begin(&self) -> Result<Box<dyn StudentUnitOfWork>>;
}

/// Write operations executed inside a single store transaction.
pub trait StudentUnitOfWork: Send {
    /// Insert a student and return it with the store-assigned id.
    fn register_student(&mut self, student: &Student) -> Result<Student>;

    /// Insert an enrollment and return it with the store-assigned id.
    fn register_student_course(&mut self, course: &StudentCourse) -> Result<StudentCourse>;

    /// Insert a status row and return it with the store-assigned id.
    fn register_course_status(&mut self, status: &CourseStatus) -> Result<CourseStatus>;

    /// Overwrite a student's full field set, including `is_deleted`.
    /// Fails with `NotFound` when the id does not exist.
    fn update_student(&mut self, student: &Student) -> Result<()>;

    /// Update an enrollment's course name. Unknown ids are a no-op.
    fn update_student_course(&mut self, course: &StudentCourse) -> Result<()>;

    /// Overwrite a status row. Fails with `NotFound` when the id does
    /// not exist.
    fn update_course_status(&mut self, status: &CourseStatus) -> Result<()>;

    /// Commit everything written through this unit of work.
    fn commit(self: Box<Self>) -> Result<()>;
}
