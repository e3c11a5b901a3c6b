//! Mock repository implementations for testing
//!
//! Provides an in-memory mock of the student repository port, enabling
//! deterministic service tests without database dependencies. Writes made
//! through a unit of work are staged and only published to the shared
//! store on commit, so rollback is observable; individual inserts can be
//! made to fail to exercise the atomicity guarantees.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use studyhall_core::{StudentRepository, StudentSearchConditions, StudentUnitOfWork};
use studyhall_domain::{
    ApplicationStatus, CourseStatus, CourseStudentCount, Result as DomainResult, Student,
    StudentCourse, StudyHallError,
};

/// Snapshot of the mock store's rows.
#[derive(Debug, Default, Clone)]
pub struct StoreState {
    pub students: Vec<Student>,
    pub courses: Vec<StudentCourse>,
    pub statuses: Vec<CourseStatus>,
    next_id: i64,
}

impl StoreState {
    fn alloc_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory mock for `StudentRepository`.
#[derive(Default, Clone)]
pub struct InMemoryStudentRepository {
    state: Arc<Mutex<StoreState>>,
    calls: Arc<Mutex<Vec<&'static str>>>,
    fail_course_insert_at: Option<usize>,
    fail_course_update_at: Option<usize>,
}

impl InMemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a student row, assigning an id when the seed has none.
    pub fn with_student(self, mut student: Student) -> Self {
        {
            let mut state = self.state.lock().expect("state poisoned");
            if student.id.is_none() {
                student.id = Some(state.alloc_id());
            } else {
                state.next_id = state.next_id.max(student.id.unwrap_or(0));
            }
            state.students.push(student);
        }
        self
    }

    /// Seed a course row, assigning an id when the seed has none.
    pub fn with_course(self, mut course: StudentCourse) -> Self {
        {
            let mut state = self.state.lock().expect("state poisoned");
            if course.id.is_none() {
                course.id = Some(state.alloc_id());
            } else {
                state.next_id = state.next_id.max(course.id.unwrap_or(0));
            }
            state.courses.push(course);
        }
        self
    }

    /// Seed a status row, assigning an id when the seed has none.
    pub fn with_status(self, mut status: CourseStatus) -> Self {
        {
            let mut state = self.state.lock().expect("state poisoned");
            if status.id.is_none() {
                status.id = Some(state.alloc_id());
            } else {
                state.next_id = state.next_id.max(status.id.unwrap_or(0));
            }
            state.statuses.push(status);
        }
        self
    }

    /// Make the nth course insert (1-based) inside a unit of work fail.
    pub fn failing_course_insert_at(mut self, nth: usize) -> Self {
        self.fail_course_insert_at = Some(nth);
        self
    }

    /// Make the nth course update (1-based) inside a unit of work fail.
    pub fn failing_course_update_at(mut self, nth: usize) -> Self {
        self.fail_course_update_at = Some(nth);
        self
    }

    /// Committed students.
    pub fn students(&self) -> Vec<Student> {
        self.state.lock().expect("state poisoned").students.clone()
    }

    /// Committed courses.
    pub fn courses(&self) -> Vec<StudentCourse> {
        self.state.lock().expect("state poisoned").courses.clone()
    }

    /// Committed statuses.
    pub fn statuses(&self) -> Vec<CourseStatus> {
        self.state.lock().expect("state poisoned").statuses.clone()
    }

    /// Names of the write operations attempted so far, in order, whether
    /// or not their transaction committed.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls poisoned").clone()
    }
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepository {
    async fn search_students(&self) -> DomainResult<Vec<Student>> {
        Ok(self.students())
    }

    async fn search_student(&self, id: i64) -> DomainResult<Option<Student>> {
        Ok(self.students().into_iter().find(|s| s.id == Some(id)))
    }

    async fn search_student_course_list(&self) -> DomainResult<Vec<StudentCourse>> {
        Ok(self.courses())
    }

    async fn search_student_courses_by_student_id(
        &self,
        student_id: i64,
    ) -> DomainResult<Vec<StudentCourse>> {
        Ok(self
            .courses()
            .into_iter()
            .filter(|c| c.student_id == Some(student_id))
            .collect())
    }

    async fn search_courses_by_course_id(
        &self,
        course_id: i64,
    ) -> DomainResult<Vec<StudentCourse>> {
        Ok(self.courses().into_iter().filter(|c| c.id == Some(course_id)).collect())
    }

    async fn search_course_status(&self, course_id: i64) -> DomainResult<Option<CourseStatus>> {
        Ok(self.statuses().into_iter().find(|s| s.course_id == course_id))
    }

    async fn search_course_status_list(&self) -> DomainResult<Vec<CourseStatus>> {
        Ok(self.statuses())
    }

    async fn find_students_by_conditions(
        &self,
        conditions: &StudentSearchConditions,
    ) -> DomainResult<Vec<Student>> {
        Ok(self
            .students()
            .into_iter()
            .filter(|s| {
                conditions.name.as_deref().map_or(true, |v| s.name.contains(v))
                    && conditions.furigana.as_deref().map_or(true, |v| s.furigana.contains(v))
                    && conditions.city.as_deref().map_or(true, |v| s.city.contains(v))
                    && conditions.age.map_or(true, |v| s.age == v)
                    && conditions.gender.as_deref().map_or(true, |v| s.gender == v)
            })
            .collect())
    }

    async fn find_courses_by_conditions(
        &self,
        course_name: Option<&str>,
    ) -> DomainResult<Vec<StudentCourse>> {
        Ok(self
            .courses()
            .into_iter()
            .filter(|c| course_name.map_or(true, |v| c.course_name.contains(v)))
            .collect())
    }

    async fn find_course_status_by_conditions(
        &self,
        status: Option<ApplicationStatus>,
    ) -> DomainResult<Vec<CourseStatus>> {
        Ok(self
            .statuses()
            .into_iter()
            .filter(|s| status.map_or(true, |v| s.status == v))
            .collect())
    }

    async fn count_students_by_course(&self) -> DomainResult<Vec<CourseStudentCount>> {
        let mut counts: Vec<CourseStudentCount> = Vec::new();
        for course in self.courses() {
            match counts.iter_mut().find(|c| c.course_name == course.course_name) {
                Some(entry) => entry.student_count += 1,
                None => counts.push(CourseStudentCount {
                    course_name: course.course_name.clone(),
                    student_count: 1,
                }),
            }
        }
        counts.sort_by(|a, b| a.course_name.cmp(&b.course_name));
        Ok(counts)
    }

    fn begin(&self) -> DomainResult<Box<dyn StudentUnitOfWork>> {
        let staged = self.state.lock().expect("state poisoned").clone();
        Ok(Box::new(InMemoryUnitOfWork {
            shared: Arc::clone(&self.state),
            staged,
            calls: Arc::clone(&self.calls),
            fail_course_insert_at: self.fail_course_insert_at,
            fail_course_update_at: self.fail_course_update_at,
            course_inserts: 0,
            course_updates: 0,
        }))
    }
}

/// Unit of work over a staged copy of the store; publishes on commit.
pub struct InMemoryUnitOfWork {
    shared: Arc<Mutex<StoreState>>,
    staged: StoreState,
    calls: Arc<Mutex<Vec<&'static str>>>,
    fail_course_insert_at: Option<usize>,
    fail_course_update_at: Option<usize>,
    course_inserts: usize,
    course_updates: usize,
}

impl InMemoryUnitOfWork {
    fn record(&self, call: &'static str) {
        self.calls.lock().expect("calls poisoned").push(call);
    }
}

impl StudentUnitOfWork for InMemoryUnitOfWork {
    fn register_student(&mut self, student: &Student) -> DomainResult<Student> {
        self.record("register_student");
        let mut student = student.clone();
        student.id = Some(self.staged.alloc_id());
        self.staged.students.push(student.clone());
        Ok(student)
    }

    fn register_student_course(&mut self, course: &StudentCourse) -> DomainResult<StudentCourse> {
        self.record("register_student_course");
        self.course_inserts += 1;
        if self.fail_course_insert_at == Some(self.course_inserts) {
            return Err(StudyHallError::Database("injected course insert failure".into()));
        }
        let mut course = course.clone();
        course.id = Some(self.staged.alloc_id());
        self.staged.courses.push(course.clone());
        Ok(course)
    }

    fn register_course_status(&mut self, status: &CourseStatus) -> DomainResult<CourseStatus> {
        self.record("register_course_status");
        let mut status = status.clone();
        status.id = Some(self.staged.alloc_id());
        self.staged.statuses.push(status.clone());
        Ok(status)
    }

    fn update_student(&mut self, student: &Student) -> DomainResult<()> {
        self.record("update_student");
        let target = self
            .staged
            .students
            .iter_mut()
            .find(|s| s.id.is_some() && s.id == student.id)
            .ok_or_else(|| {
                StudyHallError::NotFound(format!("student {:?} not found", student.id))
            })?;
        *target = student.clone();
        Ok(())
    }

    fn update_student_course(&mut self, course: &StudentCourse) -> DomainResult<()> {
        self.record("update_student_course");
        self.course_updates += 1;
        if self.fail_course_update_at == Some(self.course_updates) {
            return Err(StudyHallError::Database("injected course update failure".into()));
        }
        if let Some(target) =
            self.staged.courses.iter_mut().find(|c| c.id.is_some() && c.id == course.id)
        {
            target.course_name = course.course_name.clone();
        }
        Ok(())
    }

    fn update_course_status(&mut self, status: &CourseStatus) -> DomainResult<()> {
        self.record("update_course_status");
        let target = self
            .staged
            .statuses
            .iter_mut()
            .find(|s| s.id.is_some() && s.id == status.id)
            .ok_or_else(|| {
                StudyHallError::NotFound(format!("course status {:?} not found", status.id))
            })?;
        target.status = status.status;
        Ok(())
    }

    fn commit(self: Box<Self>) -> DomainResult<()> {
        *self.shared.lock().expect("state poisoned") = self.staged;
        Ok(())
    }
}
