//! Pure join logic turning entity rows into composite views

use std::collections::HashMap;

use studyhall_domain::{CourseDetail, CourseStatus, Student, StudentCourse, StudentDetail};

/// Joins students with their enrollments into [`StudentDetail`] aggregates.
#[derive(Debug, Default, Clone, Copy)]
pub struct StudentConverter;

impl StudentConverter {
    /// Group every course whose `student_id` matches a student's `id` into
    /// that student's course list, preserving the courses' relative order
    /// from the input. Produces one detail per student, with an empty
    /// course list when nothing matched. Courses matching no student are
    /// dropped rather than attached elsewhere.
    pub fn convert_student_details(
        &self,
        students: Vec<Student>,
        courses: Vec<StudentCourse>,
    ) -> Vec<StudentDetail> {
        let mut by_student: HashMap<i64, Vec<StudentCourse>> = HashMap::new();
        for course in courses {
            if let Some(student_id) = course.student_id {
                by_student.entry(student_id).or_default().push(course);
            }
        }

        students
            .into_iter()
            .map(|student| {
                let courses = student
                    .id
                    .and_then(|id| by_student.remove(&id))
                    .unwrap_or_default();
                self.convert_to_student_detail(student, courses)
            })
            .collect()
    }

    /// Wrap one student with a course list the caller already filtered.
    pub fn convert_to_student_detail(
        &self,
        student: Student,
        courses: Vec<StudentCourse>,
    ) -> StudentDetail {
        StudentDetail { student, courses }
    }
}

/// Joins enrollments with their application statuses into [`CourseDetail`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct CourseConverter;

impl CourseConverter {
    /// Pair each course with the first status whose `course_id` matches the
    /// course's id. A course without a matching status gets `None`; this
    /// join never fails on a missing match.
    pub fn convert_to_course_details(
        &self,
        courses: Vec<StudentCourse>,
        statuses: &[CourseStatus],
    ) -> Vec<CourseDetail> {
        courses
            .into_iter()
            .map(|course| {
                let status = statuses
                    .iter()
                    .find(|status| course.id.is_some_and(|id| status.course_id == id))
                    .cloned();
                self.convert_to_course_detail(course, status)
            })
            .collect()
    }

    /// Wrap a single course/status pair directly, without any lookup.
    pub fn convert_to_course_detail(
        &self,
        course: StudentCourse,
        status: Option<CourseStatus>,
    ) -> CourseDetail {
        CourseDetail { course, status }
    }
}

#[cfg(test)]
mod tests {
    use studyhall_domain::ApplicationStatus;

    use super::*;

    fn student(id: i64, name: &str) -> Student {
        Student {
            id: Some(id),
            name: name.to_string(),
            furigana: name.to_lowercase(),
            nickname: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            city: "Tokyo".to_string(),
            age: 20,
            gender: "female".to_string(),
            remark: None,
            is_deleted: false,
        }
    }

    fn course(id: i64, student_id: Option<i64>, name: &str) -> StudentCourse {
        StudentCourse {
            id: Some(id),
            student_id,
            course_name: name.to_string(),
            start_date: None,
            end_date: None,
        }
    }

    fn status(id: i64, course_id: i64, state: ApplicationStatus) -> CourseStatus {
        CourseStatus { id: Some(id), course_id, status: state }
    }

    #[test]
    fn groups_courses_under_their_student() {
        let students = vec![student(1, "Anna"), student(2, "Ben")];
        let courses = vec![
            course(10, Some(1), "Java Course"),
            course(11, Some(2), "AWS Course"),
            course(12, Some(1), "Design Course"),
        ];

        let details = StudentConverter.convert_student_details(students, courses);

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].courses.len(), 2);
        assert_eq!(details[0].courses[0].course_name, "Java Course");
        assert_eq!(details[0].courses[1].course_name, "Design Course");
        assert_eq!(details[1].courses.len(), 1);
        assert_eq!(details[1].courses[0].course_name, "AWS Course");
    }

    #[test]
    fn student_without_courses_gets_empty_list() {
        let students = vec![student(1, "Anna")];

        let details = StudentConverter.convert_student_details(students, Vec::new());

        assert_eq!(details.len(), 1);
        assert!(details[0].courses.is_empty());
    }

    #[test]
    fn course_of_unknown_student_is_not_misattached() {
        let students = vec![student(1, "Anna")];
        let courses = vec![
            course(10, Some(1), "Java Course"),
            course(11, Some(99), "Orphan Course"),
            course(12, None, "Unassigned Course"),
        ];

        let details = StudentConverter.convert_student_details(students, courses);

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].courses.len(), 1);
        assert_eq!(details[0].courses[0].course_name, "Java Course");
    }

    #[test]
    fn course_order_from_input_is_preserved() {
        let students = vec![student(1, "Anna")];
        let courses = vec![
            course(12, Some(1), "third"),
            course(10, Some(1), "first"),
            course(11, Some(1), "second"),
        ];

        let details = StudentConverter.convert_student_details(students, courses);

        let names: Vec<_> =
            details[0].courses.iter().map(|c| c.course_name.as_str()).collect();
        assert_eq!(names, ["third", "first", "second"]);
    }

    #[test]
    fn status_attaches_iff_course_id_matches() {
        let courses = vec![course(10, Some(1), "Java Course"), course(11, Some(1), "AWS Course")];
        let statuses = vec![status(100, 10, ApplicationStatus::InProgress)];

        let details = CourseConverter.convert_to_course_details(courses, &statuses);

        assert_eq!(details.len(), 2);
        assert_eq!(
            details[0].status.as_ref().map(|s| s.status),
            Some(ApplicationStatus::InProgress)
        );
        assert!(details[1].status.is_none());
    }

    #[test]
    fn first_matching_status_wins() {
        let courses = vec![course(10, Some(1), "Java Course")];
        let statuses = vec![
            status(100, 10, ApplicationStatus::ProvisionalApplication),
            status(101, 10, ApplicationStatus::Completed),
        ];

        let details = CourseConverter.convert_to_course_details(courses, &statuses);

        let attached = details[0].status.as_ref().expect("status attached");
        assert_eq!(attached.id, Some(100));
        assert_eq!(attached.status, ApplicationStatus::ProvisionalApplication);
    }

    #[test]
    fn course_without_id_gets_no_status() {
        let mut orphan = course(0, Some(1), "Java Course");
        orphan.id = None;
        let statuses = vec![status(100, 0, ApplicationStatus::InProgress)];

        let details = CourseConverter.convert_to_course_details(vec![orphan], &statuses);

        assert!(details[0].status.is_none());
    }

    #[test]
    fn single_pair_conversion_wraps_directly() {
        let c = course(10, Some(1), "Java Course");
        let s = status(100, 10, ApplicationStatus::Completed);

        let detail = CourseConverter.convert_to_course_detail(c.clone(), Some(s.clone()));

        assert_eq!(detail.course, c);
        assert_eq!(detail.status, Some(s));
    }
}
