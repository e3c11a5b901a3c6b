//! SQLite-backed student repository.
//!
//! Implements the async `StudentRepository` read port plus the
//! `StudentUnitOfWork` write port. Reads run on the blocking pool against
//! the shared connection pool provided by [`DbManager`]; writes execute on
//! a dedicated pooled connection inside an explicit transaction that rolls
//! back unless committed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Row, ToSql};
use studyhall_core::{StudentRepository, StudentSearchConditions, StudentUnitOfWork};
use studyhall_domain::{
    ApplicationStatus, CourseStatus, CourseStudentCount, Result as DomainResult, Student,
    StudentCourse, StudyHallError,
};
use tokio::task;

use super::manager::{DbConnection, DbManager};
use crate::errors::{map_join_error, map_sql_error};

/// Async read repository + transactional write port backed by SQLite.
pub struct SqliteStudentRepository {
    db: Arc<DbManager>,
}

impl SqliteStudentRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    async fn with_conn<T, F>(&self, f: F) -> DomainResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&DbConnection) -> DomainResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || {
            let conn = db.get_connection()?;
            f(&conn)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl StudentRepository for SqliteStudentRepository {
    async fn search_students(&self) -> DomainResult<Vec<Student>> {
        self.with_conn(|conn| query_rows(conn, SELECT_STUDENTS, &[], map_student_row)).await
    }

    async fn search_student(&self, id: i64) -> DomainResult<Option<Student>> {
        self.with_conn(move |conn| {
            let params: [&dyn ToSql; 1] = [&id];
            let students =
                query_rows(conn, SELECT_STUDENT_BY_ID, params.as_slice(), map_student_row)?;
            Ok(students.into_iter().next())
        })
        .await
    }

    async fn search_student_course_list(&self) -> DomainResult<Vec<StudentCourse>> {
        self.with_conn(|conn| query_rows(conn, SELECT_COURSES, &[], map_course_row)).await
    }

    async fn search_student_courses_by_student_id(
        &self,
        student_id: i64,
    ) -> DomainResult<Vec<StudentCourse>> {
        self.with_conn(move |conn| {
            let params: [&dyn ToSql; 1] = [&student_id];
            query_rows(conn, SELECT_COURSES_BY_STUDENT, params.as_slice(), map_course_row)
        })
        .await
    }

    async fn search_courses_by_course_id(
        &self,
        course_id: i64,
    ) -> DomainResult<Vec<StudentCourse>> {
        self.with_conn(move |conn| {
            let params: [&dyn ToSql; 1] = [&course_id];
            query_rows(conn, SELECT_COURSES_BY_ID, params.as_slice(), map_course_row)
        })
        .await
    }

    async fn search_course_status(&self, course_id: i64) -> DomainResult<Option<CourseStatus>> {
        self.with_conn(move |conn| {
            let params: [&dyn ToSql; 1] = [&course_id];
            let statuses =
                query_rows(conn, SELECT_STATUS_BY_COURSE, params.as_slice(), map_status_row)?;
            Ok(statuses.into_iter().next())
        })
        .await
    }

    async fn search_course_status_list(&self) -> DomainResult<Vec<CourseStatus>> {
        self.with_conn(|conn| query_rows(conn, SELECT_STATUSES, &[], map_status_row)).await
    }

    async fn find_students_by_conditions(
        &self,
        conditions: &StudentSearchConditions,
    ) -> DomainResult<Vec<Student>> {
        let conditions = conditions.clone();
        self.with_conn(move |conn| {
            let (sql, params) = build_student_conditions_query(&conditions);
            let param_refs: Vec<&dyn ToSql> =
                params.iter().map(|p| p.as_ref() as &dyn ToSql).collect();
            query_rows(conn, &sql, param_refs.as_slice(), map_student_row)
        })
        .await
    }

    async fn find_courses_by_conditions(
        &self,
        course_name: Option<&str>,
    ) -> DomainResult<Vec<StudentCourse>> {
        let pattern = course_name.map(|name| format!("%{name}%"));
        self.with_conn(move |conn| match &pattern {
            Some(pattern) => {
                let params: [&dyn ToSql; 1] = [pattern];
                query_rows(conn, SELECT_COURSES_BY_NAME, params.as_slice(), map_course_row)
            }
            None => query_rows(conn, SELECT_COURSES, &[], map_course_row),
        })
        .await
    }

    async fn find_course_status_by_conditions(
        &self,
        status: Option<ApplicationStatus>,
    ) -> DomainResult<Vec<CourseStatus>> {
        self.with_conn(move |conn| match status {
            Some(status) => {
                let value = status.as_str();
                let params: [&dyn ToSql; 1] = [&value];
                query_rows(conn, SELECT_STATUSES_BY_STATE, params.as_slice(), map_status_row)
            }
            None => query_rows(conn, SELECT_STATUSES, &[], map_status_row),
        })
        .await
    }

    async fn count_students_by_course(&self) -> DomainResult<Vec<CourseStudentCount>> {
        self.with_conn(|conn| query_rows(conn, COUNT_STUDENTS_BY_COURSE, &[], map_count_row))
            .await
    }

    fn begin(&self) -> DomainResult<Box<dyn StudentUnitOfWork>> {
        let conn = self.db.get_connection()?;
        conn.execute_batch("BEGIN IMMEDIATE").map_err(map_sql_error)?;
        Ok(Box::new(SqliteUnitOfWork { conn, committed: false }))
    }
}

/// Unit of work over one pooled connection; rolls back unless committed.
pub struct SqliteUnitOfWork {
    conn: DbConnection,
    committed: bool,
}

impl StudentUnitOfWork for SqliteUnitOfWork {
    fn register_student(&mut self, student: &Student) -> DomainResult<Student> {
        let is_deleted = bool_to_int(student.is_deleted);
        let params: [&dyn ToSql; 9] = [
            &student.name,
            &student.furigana,
            &student.nickname,
            &student.email,
            &student.city,
            &student.age,
            &student.gender,
            &student.remark,
            &is_deleted,
        ];
        self.conn.execute(INSERT_STUDENT_SQL, params.as_slice()).map_err(map_sql_error)?;

        let mut registered = student.clone();
        registered.id = Some(self.conn.last_insert_rowid());
        Ok(registered)
    }

    fn register_student_course(&mut self, course: &StudentCourse) -> DomainResult<StudentCourse> {
        let student_id = course.student_id.ok_or_else(|| {
            StudyHallError::InvalidInput("course is missing its student id".into())
        })?;
        let start = course.start_date.map(|date| date.timestamp());
        let end = course.end_date.map(|date| date.timestamp());
        let params: [&dyn ToSql; 4] = [&student_id, &course.course_name, &start, &end];
        self.conn.execute(INSERT_COURSE_SQL, params.as_slice()).map_err(map_sql_error)?;

        let mut registered = course.clone();
        registered.id = Some(self.conn.last_insert_rowid());
        Ok(registered)
    }

    fn register_course_status(&mut self, status: &CourseStatus) -> DomainResult<CourseStatus> {
        let value = status.status.as_str();
        let params: [&dyn ToSql; 2] = [&status.course_id, &value];
        self.conn.execute(INSERT_STATUS_SQL, params.as_slice()).map_err(map_sql_error)?;

        let mut registered = status.clone();
        registered.id = Some(self.conn.last_insert_rowid());
        Ok(registered)
    }

    fn update_student(&mut self, student: &Student) -> DomainResult<()> {
        let id = student.id.ok_or_else(|| {
            StudyHallError::InvalidInput("student id is required for an update".into())
        })?;
        let is_deleted = bool_to_int(student.is_deleted);
        let params: [&dyn ToSql; 10] = [
            &student.name,
            &student.furigana,
            &student.nickname,
            &student.email,
            &student.city,
            &student.age,
            &student.gender,
            &student.remark,
            &is_deleted,
            &id,
        ];
        let affected =
            self.conn.execute(UPDATE_STUDENT_SQL, params.as_slice()).map_err(map_sql_error)?;
        if affected == 0 {
            return Err(StudyHallError::NotFound(format!("student {id} not found")));
        }
        Ok(())
    }

    fn update_student_course(&mut self, course: &StudentCourse) -> DomainResult<()> {
        // Unknown ids are a silent no-op on this path.
        let params: [&dyn ToSql; 2] = [&course.course_name, &course.id];
        self.conn.execute(UPDATE_COURSE_NAME_SQL, params.as_slice()).map_err(map_sql_error)?;
        Ok(())
    }

    fn update_course_status(&mut self, status: &CourseStatus) -> DomainResult<()> {
        let value = status.status.as_str();
        let params: [&dyn ToSql; 2] = [&value, &status.id];
        let affected = self
            .conn
            .execute(UPDATE_STATUS_SQL, params.as_slice())
            .map_err(map_sql_error)?;
        if affected == 0 {
            return Err(StudyHallError::NotFound(format!(
                "course status {:?} not found",
                status.id
            )));
        }
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> DomainResult<()> {
        self.conn.execute_batch("COMMIT").map_err(map_sql_error)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for SqliteUnitOfWork {
    fn drop(&mut self) {
        if !self.committed {
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}

const STUDENT_COLUMNS: &str =
    "id, name, furigana, nickname, email, city, age, gender, remark, is_deleted";

const SELECT_STUDENTS: &str = "SELECT id, name, furigana, nickname, email, city, age, gender, remark, is_deleted
    FROM students
    ORDER BY id";

const SELECT_STUDENT_BY_ID: &str = "SELECT id, name, furigana, nickname, email, city, age, gender, remark, is_deleted
    FROM students
    WHERE id = ?1";

const SELECT_COURSES: &str = "SELECT id, student_id, course_name, start_date, end_date
    FROM student_courses
    ORDER BY id";

const SELECT_COURSES_BY_STUDENT: &str = "SELECT id, student_id, course_name, start_date, end_date
    FROM student_courses
    WHERE student_id = ?1
    ORDER BY id";

const SELECT_COURSES_BY_ID: &str = "SELECT id, student_id, course_name, start_date, end_date
    FROM student_courses
    WHERE id = ?1";

const SELECT_COURSES_BY_NAME: &str = "SELECT id, student_id, course_name, start_date, end_date
    FROM student_courses
    WHERE course_name LIKE ?1
    ORDER BY id";

const SELECT_STATUS_BY_COURSE: &str = "SELECT id, course_id, status
    FROM course_statuses
    WHERE course_id = ?1
    ORDER BY id
    LIMIT 1";

const SELECT_STATUSES: &str = "SELECT id, course_id, status
    FROM course_statuses
    ORDER BY id";

const SELECT_STATUSES_BY_STATE: &str = "SELECT id, course_id, status
    FROM course_statuses
    WHERE status = ?1
    ORDER BY id";

const COUNT_STUDENTS_BY_COURSE: &str = "SELECT course_name, COUNT(student_id)
    FROM student_courses
    GROUP BY course_name
    ORDER BY course_name";

const INSERT_STUDENT_SQL: &str = "INSERT INTO students (
        name, furigana, nickname, email, city, age, gender, remark, is_deleted
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

const INSERT_COURSE_SQL: &str = "INSERT INTO student_courses (
        student_id, course_name, start_date, end_date
    ) VALUES (?1, ?2, ?3, ?4)";

const INSERT_STATUS_SQL: &str =
    "INSERT INTO course_statuses (course_id, status) VALUES (?1, ?2)";

const UPDATE_STUDENT_SQL: &str = "UPDATE students
    SET name = ?1, furigana = ?2, nickname = ?3, email = ?4, city = ?5,
        age = ?6, gender = ?7, remark = ?8, is_deleted = ?9
    WHERE id = ?10";

const UPDATE_COURSE_NAME_SQL: &str =
    "UPDATE student_courses SET course_name = ?1 WHERE id = ?2";

const UPDATE_STATUS_SQL: &str = "UPDATE course_statuses SET status = ?1 WHERE id = ?2";

fn query_rows<T>(
    conn: &DbConnection,
    sql: &str,
    params: &[&dyn ToSql],
    mapper: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> DomainResult<Vec<T>> {
    let mut stmt = conn.prepare(sql).map_err(map_sql_error)?;
    let rows = stmt.query_map(params, mapper).map_err(map_sql_error)?;
    rows.collect::<rusqlite::Result<Vec<T>>>().map_err(map_sql_error)
}

fn build_student_conditions_query(
    conditions: &StudentSearchConditions,
) -> (String, Vec<Box<dyn ToSql + Send>>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn ToSql + Send>> = Vec::new();

    if let Some(name) = &conditions.name {
        params.push(Box::new(format!("%{name}%")));
        clauses.push(format!("name LIKE ?{}", params.len()));
    }
    if let Some(furigana) = &conditions.furigana {
        params.push(Box::new(format!("%{furigana}%")));
        clauses.push(format!("furigana LIKE ?{}", params.len()));
    }
    if let Some(city) = &conditions.city {
        params.push(Box::new(format!("%{city}%")));
        clauses.push(format!("city LIKE ?{}", params.len()));
    }
    if let Some(age) = conditions.age {
        params.push(Box::new(age));
        clauses.push(format!("age = ?{}", params.len()));
    }
    if let Some(gender) = &conditions.gender {
        params.push(Box::new(gender.clone()));
        clauses.push(format!("gender = ?{}", params.len()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    let sql = format!("SELECT {STUDENT_COLUMNS} FROM students{where_sql} ORDER BY id");
    (sql, params)
}

fn map_student_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        furigana: row.get(2)?,
        nickname: row.get(3)?,
        email: row.get(4)?,
        city: row.get(5)?,
        age: row.get(6)?,
        gender: row.get(7)?,
        remark: row.get(8)?,
        is_deleted: int_to_bool(row.get(9)?),
    })
}

fn map_course_row(row: &Row<'_>) -> rusqlite::Result<StudentCourse> {
    Ok(StudentCourse {
        id: Some(row.get(0)?),
        student_id: row.get(1)?,
        course_name: row.get(2)?,
        start_date: from_timestamp(row.get(3)?),
        end_date: from_timestamp(row.get(4)?),
    })
}

fn map_status_row(row: &Row<'_>) -> rusqlite::Result<CourseStatus> {
    let raw: String = row.get(2)?;
    let status = raw.parse::<ApplicationStatus>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(err))
    })?;
    Ok(CourseStatus { id: Some(row.get(0)?), course_id: row.get(1)?, status })
}

fn map_count_row(row: &Row<'_>) -> rusqlite::Result<CourseStudentCount> {
    Ok(CourseStudentCount { course_name: row.get(0)?, student_count: row.get(1)? })
}

fn from_timestamp(value: Option<i64>) -> Option<DateTime<Utc>> {
    value.and_then(|secs| DateTime::from_timestamp(secs, 0))
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

fn int_to_bool(value: i64) -> bool {
    value != 0
}
