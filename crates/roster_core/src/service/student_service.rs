//! Student store.
//!
//! # Responsibility
//! - Enroll, rename, move and delete students.
//! - Provide paged listings scoped to one institution.
//!
//! # Invariants
//! - Enrollment targets are resolved through the course store first; a
//!   missing course never produces a student row.
//! - `change_course` stays inside the student's current institution,
//!   `transfer` may cross institutions.

use crate::model::listing::PageRequest;
use crate::model::student::{Student, StudentId};
use crate::repo::course_repo::CourseRepository;
use crate::repo::student_repo::{StudentListQuery, StudentRepository};
use crate::repo::EntityRef;
use crate::service::course_service::CourseService;
use crate::service::{normalize_name, ServiceError, ServiceResult};

pub struct StudentService<S: StudentRepository, C: CourseRepository> {
    repo: S,
    courses: CourseService<C>,
}

impl<S: StudentRepository, C: CourseRepository> StudentService<S, C> {
    pub fn new(repo: S, courses: CourseService<C>) -> Self {
        Self { repo, courses }
    }

    /// Enrolls a new student into `(course_name, institution_name)`.
    ///
    /// Returns the stored student including its generated id.
    pub fn add(
        &self,
        student_name: &str,
        course_name: &str,
        institution_name: &str,
    ) -> ServiceResult<Student> {
        let student_name = normalize_name(student_name, "studentName")?;
        let course_name = normalize_name(course_name, "courseName")?;
        let institution_name = normalize_name(institution_name, "institutionName")?;

        let course = self
            .courses
            .get_if_exists(&course_name, &institution_name)?
            .ok_or_else(|| ServiceError::NotFound(EntityRef::course(course_name, institution_name)))?;
        Ok(self.repo.create_student(&student_name, &course)?)
    }

    pub fn get(&self, student_id: StudentId) -> ServiceResult<Student> {
        self.repo
            .get_student(student_id)?
            .ok_or(ServiceError::NotFound(EntityRef::student(student_id)))
    }

    /// Deletes unconditionally; students have no dependents.
    pub fn delete(&self, student_id: StudentId) -> ServiceResult<()> {
        self.repo.delete_student(student_id)?;
        Ok(())
    }

    pub fn rename(&self, student_id: StudentId, new_name: &str) -> ServiceResult<()> {
        let new_name = normalize_name(new_name, "newStudentName")?;
        self.repo.rename_student(student_id, &new_name)?;
        Ok(())
    }

    /// Moves a student to another course of its current institution.
    pub fn change_course(
        &self,
        student_id: StudentId,
        new_course_name: &str,
    ) -> ServiceResult<Student> {
        let new_course_name = normalize_name(new_course_name, "newCourse")?;
        let student = self.get(student_id)?;

        let course = self
            .courses
            .get_if_exists(&new_course_name, &student.institution_name)?
            .ok_or_else(|| {
                ServiceError::NotFound(EntityRef::course(
                    new_course_name,
                    student.institution_name.as_str(),
                ))
            })?;
        self.repo.reassign_course(student_id, &course)?;
        self.get(student_id)
    }

    /// Moves a student to `(new_course_name, new_institution_name)`,
    /// regardless of its current institution.
    pub fn transfer(
        &self,
        student_id: StudentId,
        new_institution_name: &str,
        new_course_name: &str,
    ) -> ServiceResult<Student> {
        let new_institution_name = normalize_name(new_institution_name, "newInstitution")?;
        let new_course_name = normalize_name(new_course_name, "newCourse")?;
        self.get(student_id)?;

        let course = self
            .courses
            .get_if_exists(&new_course_name, &new_institution_name)?
            .ok_or_else(|| {
                ServiceError::NotFound(EntityRef::course(new_course_name, new_institution_name))
            })?;
        self.repo.reassign_course(student_id, &course)?;
        self.get(student_id)
    }

    pub fn list_by_institution(
        &self,
        institution_name: &str,
        page: PageRequest,
    ) -> ServiceResult<Vec<Student>> {
        self.list(StudentListQuery {
            institution_name: institution_name.trim().to_string(),
            page,
            ..StudentListQuery::default()
        })
    }

    /// Matches `keyword` against student id, student name and course name.
    pub fn search_by_institution(
        &self,
        keyword: &str,
        institution_name: &str,
        page: PageRequest,
    ) -> ServiceResult<Vec<Student>> {
        self.list(StudentListQuery {
            institution_name: institution_name.trim().to_string(),
            keyword: Some(keyword.trim().to_string()),
            page,
            ..StudentListQuery::default()
        })
    }

    pub fn filter_by_institution_and_course(
        &self,
        institution_name: &str,
        course_name: &str,
        page: PageRequest,
    ) -> ServiceResult<Vec<Student>> {
        self.list(StudentListQuery {
            institution_name: institution_name.trim().to_string(),
            course_name: Some(course_name.trim().to_string()),
            keyword: None,
            page,
        })
    }

    pub fn has_no_students(&self, course_name: &str, institution_name: &str) -> ServiceResult<bool> {
        Ok(!self
            .repo
            .course_has_students(course_name.trim(), institution_name.trim())?)
    }

    fn list(&self, query: StudentListQuery) -> ServiceResult<Vec<Student>> {
        Ok(self.repo.list_students(&query)?)
    }
}
