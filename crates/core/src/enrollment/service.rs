//! Student service - search, registration and update workflows

use std::sync::Arc;

use chrono::{DateTime, Months, Utc};
use studyhall_domain::{
    ApplicationStatus, CourseDetail, CourseStatus, CourseStudentCount, IntegratedDetail, Result,
    StudentCourse, StudentDetail, StudyHallError,
};
use tracing::info;

use super::converter::{CourseConverter, StudentConverter};
use super::ports::{StudentRepository, StudentSearchConditions, StudentUnitOfWork};

/// Coordinates repository access, the converters and the transactional
/// registration/update workflows.
pub struct StudentService {
    repository: Arc<dyn StudentRepository>,
    student_converter: StudentConverter,
    course_converter: CourseConverter,
}

impl StudentService {
    /// Create a new service over a repository port and the two converters.
    pub fn new(
        repository: Arc<dyn StudentRepository>,
        student_converter: StudentConverter,
        course_converter: CourseConverter,
    ) -> Self {
        Self { repository, student_converter, course_converter }
    }

    /// List every student as a [`StudentDetail`].
    ///
    /// The repository query does not filter on the logical-delete flag;
    /// when `deleted` is present the filter is applied here.
    pub async fn search_student_list(
        &self,
        deleted: Option<bool>,
    ) -> Result<Vec<StudentDetail>> {
        let mut students = self.repository.search_students().await?;
        if let Some(flag) = deleted {
            students.retain(|student| student.is_deleted == flag);
        }
        let courses = self.repository.search_student_course_list().await?;
        Ok(self.student_converter.convert_student_details(students, courses))
    }

    /// Fetch one student with their course list.
    pub async fn search_student(&self, id: i64) -> Result<StudentDetail> {
        let student = self
            .repository
            .search_student(id)
            .await?
            .ok_or_else(|| StudyHallError::NotFound(format!("student {id} not found")))?;
        let courses =
            self.repository.search_student_courses_by_student_id(id).await?;
        Ok(self.student_converter.convert_to_student_detail(student, courses))
    }

    /// Fetch one student's courses, each paired with its resolved status.
    ///
    /// Strict variant: a student with zero courses, a course without an id,
    /// or a course without a status row all fail with `NotFound`. No
    /// partial results are returned. Contrast [`Self::get_all_courses`],
    /// which tolerates missing statuses.
    pub async fn search_student_courses(&self, student_id: i64) -> Result<Vec<CourseDetail>> {
        let courses =
            self.repository.search_student_courses_by_student_id(student_id).await?;
        if courses.is_empty() {
            return Err(StudyHallError::NotFound(format!(
                "no courses found for student {student_id}"
            )));
        }

        let mut details = Vec::with_capacity(courses.len());
        for course in courses {
            let course_id = course.id.ok_or_else(|| {
                StudyHallError::NotFound(format!(
                    "course without id for student {student_id}"
                ))
            })?;
            let status = self
                .repository
                .search_course_status(course_id)
                .await?
                .ok_or_else(|| {
                    StudyHallError::NotFound(format!(
                        "course status not found for course {course_id}"
                    ))
                })?;
            details.push(self.course_converter.convert_to_course_detail(course, Some(status)));
        }
        Ok(details)
    }

    /// List every course joined against every status.
    ///
    /// Lenient variant: a course without a matching status is returned with
    /// an absent status rather than failing.
    pub async fn get_all_courses(&self) -> Result<Vec<CourseDetail>> {
        let courses = self.repository.search_student_course_list().await?;
        let statuses = self.repository.search_course_status_list().await?;
        Ok(self.course_converter.convert_to_course_details(courses, &statuses))
    }

    /// Fetch one course with its status.
    pub async fn get_course_by_id(&self, course_id: i64) -> Result<CourseDetail> {
        let course = self
            .repository
            .search_courses_by_course_id(course_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                StudyHallError::NotFound(format!("course {course_id} not found"))
            })?;
        let status = self
            .repository
            .search_course_status(course_id)
            .await?
            .ok_or_else(|| {
                StudyHallError::NotFound(format!(
                    "course status not found for course {course_id}"
                ))
            })?;
        Ok(self.course_converter.convert_to_course_detail(course, Some(status)))
    }

    /// Search students, courses and statuses by AND-combined optional
    /// conditions and join them into [`IntegratedDetail`]s, one per
    /// matching student in query order.
    pub async fn search_integrated_details(
        &self,
        conditions: StudentSearchConditions,
    ) -> Result<Vec<IntegratedDetail>> {
        let students = self.repository.find_students_by_conditions(&conditions).await?;
        let courses = self
            .repository
            .find_courses_by_conditions(conditions.course_name.as_deref())
            .await?;
        let statuses =
            self.repository.find_course_status_by_conditions(conditions.status).await?;

        let details = self.student_converter.convert_student_details(students, courses);

        Ok(details
            .into_iter()
            .map(|detail| {
                let course_details = self
                    .course_converter
                    .convert_to_course_details(detail.courses.clone(), &statuses);
                IntegratedDetail { student_detail: detail, course_details }
            })
            .collect())
    }

    /// Count enrollments grouped by course name.
    pub async fn count_students_by_course(&self) -> Result<Vec<CourseStudentCount>> {
        self.repository.count_students_by_course().await
    }

    /// Register a student together with their courses.
    ///
    /// Inside one transaction: the student row is inserted first so the
    /// generated id is available, then each course is stamped with that id
    /// and a one-year term starting now, inserted, and given an initial
    /// `PROVISIONAL_APPLICATION` status. Any failure rolls the whole
    /// registration back.
    pub async fn register_student(&self, detail: StudentDetail) -> Result<IntegratedDetail> {
        let mut tx = self.repository.begin().map_err(mutation_failure)?;
        let result = self.register_in_tx(tx.as_mut(), &detail);
        match result {
            Ok(integrated) => {
                tx.commit().map_err(mutation_failure)?;
                info!(
                    student_id = ?integrated.student_detail.student.id,
                    courses = integrated.course_details.len(),
                    "student registered"
                );
                Ok(integrated)
            }
            Err(err) => Err(mutation_failure(err)),
        }
    }

    fn register_in_tx(
        &self,
        tx: &mut dyn StudentUnitOfWork,
        detail: &StudentDetail,
    ) -> Result<IntegratedDetail> {
        let student = tx.register_student(&detail.student)?;
        let student_id = student.id.ok_or_else(|| {
            StudyHallError::Internal("store did not assign a student id".into())
        })?;

        let now = Utc::now();
        let mut courses = Vec::with_capacity(detail.courses.len());
        let mut course_details = Vec::with_capacity(detail.courses.len());
        for course in &detail.courses {
            let mut course = course.clone();
            init_student_course(&mut course, student_id, now);
            let course = tx.register_student_course(&course)?;
            let course_id = course.id.ok_or_else(|| {
                StudyHallError::Internal("store did not assign a course id".into())
            })?;

            let status = tx.register_course_status(&CourseStatus {
                id: None,
                course_id,
                status: ApplicationStatus::ProvisionalApplication,
            })?;

            course_details
                .push(self.course_converter.convert_to_course_detail(course.clone(), Some(status)));
            courses.push(course);
        }

        let student_detail = self.student_converter.convert_to_student_detail(student, courses);
        Ok(IntegratedDetail { student_detail, course_details })
    }

    /// Update a student's full field set and the course names of each
    /// listed course, atomically.
    ///
    /// `is_deleted` travels with the student row, so logical deletion and
    /// undeletion go through this same call.
    pub async fn update_student(&self, detail: StudentDetail) -> Result<()> {
        let mut tx = self.repository.begin().map_err(mutation_failure)?;
        let result = (|| -> Result<()> {
            tx.update_student(&detail.student)?;
            for course in &detail.courses {
                tx.update_student_course(course)?;
            }
            Ok(())
        })();
        match result {
            Ok(()) => {
                tx.commit().map_err(mutation_failure)?;
                info!(student_id = ?detail.student.id, "student updated");
                Ok(())
            }
            Err(err) => Err(mutation_failure(err)),
        }
    }

    /// Overwrite the status of one enrollment.
    ///
    /// Any target state is accepted, including backward transitions and the
    /// current state (a repeat write is a no-op). An unknown status id
    /// fails with `NotFound`.
    pub async fn update_course_status(&self, status: CourseStatus) -> Result<()> {
        if status.id.is_none() {
            return Err(StudyHallError::InvalidInput(
                "course status id is required for an update".into(),
            ));
        }
        let mut tx = self.repository.begin().map_err(mutation_failure)?;
        match tx.update_course_status(&status) {
            Ok(()) => {
                tx.commit().map_err(mutation_failure)?;
                info!(status_id = ?status.id, status = %status.status, "course status updated");
                Ok(())
            }
            Err(err) => Err(mutation_failure(err)),
        }
    }
}

/// Stamp server-assigned fields onto a course at registration time.
fn init_student_course(course: &mut StudentCourse, student_id: i64, now: DateTime<Utc>) {
    course.student_id = Some(student_id);
    course.start_date = Some(now);
    course.end_date = Some(course_end_date(now));
}

/// A course term runs one year from its start.
fn course_end_date(start: DateTime<Utc>) -> DateTime<Utc> {
    start.checked_add_months(Months::new(12)).unwrap_or(start)
}

/// Store failures inside a mutation surface as transaction failures;
/// not-found and validation outcomes keep their kind.
fn mutation_failure(err: StudyHallError) -> StudyHallError {
    match err {
        StudyHallError::NotFound(_)
        | StudyHallError::InvalidInput(_)
        | StudyHallError::Transaction(_) => err,
        other => StudyHallError::Transaction(other.to_string()),
    }
}
