//! Orchestration layer composing the three stores on one connection.
//!
//! # Responsibility
//! - Enforce cross-entity gates: parents must exist before children are
//!   touched, parents with children cannot be deleted.
//! - Run gate-then-mutate sequences inside one immediate transaction.
//! - Apply persisted per-session sort toggles to sorted listings.
//! - Emit metadata-only diagnostic events for every mutation.
//!
//! # Invariants
//! - An institution is deleted only when it owns zero courses.
//! - A course is deleted only when it has zero students.
//! - A sort request stores its direction only after the listing succeeded;
//!   a failed sort leaves the session's next direction unchanged.
//! - Requests without a non-blank session id sort ascending and store
//!   nothing.

use crate::db::immediate_transaction;
use crate::model::course::Course;
use crate::model::institution::Institution;
use crate::model::listing::{PageRequest, SortDirection};
use crate::model::student::{Student, StudentId};
use crate::repo::course_repo::SqliteCourseRepository;
use crate::repo::institution_repo::SqliteInstitutionRepository;
use crate::repo::session_repo::{SessionRepository, SqliteSessionRepository};
use crate::repo::student_repo::SqliteStudentRepository;
use crate::repo::{EntityRef, RepoResult};
use crate::service::course_service::CourseService;
use crate::service::institution_service::InstitutionService;
use crate::service::student_service::StudentService;
use crate::service::{normalize_name, ServiceError, ServiceResult};
use crate::session::{COURSE_SORT_KEY, INSTITUTION_SORT_KEY};
use log::{info, warn};
use rusqlite::Connection;

type Institutions<'conn> = InstitutionService<SqliteInstitutionRepository<'conn>>;
type Courses<'conn> = CourseService<SqliteCourseRepository<'conn>>;
type Students<'conn> =
    StudentService<SqliteStudentRepository<'conn>, SqliteCourseRepository<'conn>>;

/// Request-scoped facade over the institution, course and student stores.
pub struct RosterService<'conn> {
    conn: &'conn Connection,
    institutions: Institutions<'conn>,
    courses: Courses<'conn>,
    students: Students<'conn>,
    sessions: SqliteSessionRepository<'conn>,
}

impl<'conn> RosterService<'conn> {
    /// Builds all three stores over one migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let institution_repo = SqliteInstitutionRepository::try_new(conn)?;
        let course_repo = SqliteCourseRepository::try_new(conn)?;
        let student_repo = SqliteStudentRepository::try_new(conn)?;
        let sessions = SqliteSessionRepository::try_new(conn)?;
        Ok(Self {
            conn,
            institutions: InstitutionService::new(institution_repo),
            courses: CourseService::new(course_repo),
            students: StudentService::new(student_repo, CourseService::new(course_repo)),
            sessions,
        })
    }

    pub fn institutions(&self) -> &Institutions<'conn> {
        &self.institutions
    }

    pub fn courses(&self) -> &Courses<'conn> {
        &self.courses
    }

    pub fn students(&self) -> &Students<'conn> {
        &self.students
    }

    // Institutions

    pub fn add_institution(&self, name: &str) -> ServiceResult<Institution> {
        record("institution_add", self.institutions.add(name))
    }

    pub fn list_institutions(&self) -> ServiceResult<Vec<Institution>> {
        self.institutions.list()
    }

    pub fn search_institutions(&self, keyword: &str) -> ServiceResult<Vec<Institution>> {
        self.institutions.search(keyword)
    }

    /// Lists institutions by name, alternating direction per session.
    pub fn sort_institutions(
        &self,
        session_id: Option<&str>,
    ) -> ServiceResult<(SortDirection, Vec<Institution>)> {
        let direction = self.next_sort(session_id, INSTITUTION_SORT_KEY)?;
        let institutions = self.institutions.sort_by_name(direction)?;
        self.remember_sort(session_id, INSTITUTION_SORT_KEY, direction)?;
        Ok((direction, institutions))
    }

    pub fn rename_institution(&self, old_name: &str, new_name: &str) -> ServiceResult<()> {
        record(
            "institution_rename",
            self.institutions.rename(old_name, new_name),
        )
    }

    /// Deletes an institution that owns no courses.
    pub fn delete_institution(&self, name: &str) -> ServiceResult<()> {
        let result = normalize_name(name, "institutionName").and_then(|name| {
            let tx = immediate_transaction(self.conn)?;
            if !self.courses.has_no_courses(&name)? {
                return Err(ServiceError::DependencyConflict(EntityRef::institution(
                    name,
                )));
            }
            self.institutions.delete(&name)?;
            tx.commit()?;
            Ok(())
        });
        record("institution_delete", result)
    }

    // Courses

    pub fn list_courses(&self, institution_name: &str) -> ServiceResult<Vec<Course>> {
        let institution_name = self.require_institution(institution_name)?;
        self.courses.list_by_institution(&institution_name)
    }

    pub fn search_courses(
        &self,
        keyword: &str,
        institution_name: &str,
    ) -> ServiceResult<Vec<Course>> {
        let institution_name = self.require_institution(institution_name)?;
        self.courses.search(keyword, &institution_name)
    }

    /// Lists one institution's courses by name, alternating direction per
    /// session.
    pub fn sort_courses(
        &self,
        institution_name: &str,
        session_id: Option<&str>,
    ) -> ServiceResult<(SortDirection, Vec<Course>)> {
        let institution_name = self.require_institution(institution_name)?;
        let direction = self.next_sort(session_id, COURSE_SORT_KEY)?;
        let courses = self.courses.sort_by_name(&institution_name, direction)?;
        self.remember_sort(session_id, COURSE_SORT_KEY, direction)?;
        Ok((direction, courses))
    }

    pub fn add_course(&self, course_name: &str, institution_name: &str) -> ServiceResult<Course> {
        let result = normalize_name(course_name, "courseName").and_then(|course_name| {
            let institution_name = self.require_institution(institution_name)?;
            self.courses.add(&course_name, &institution_name)
        });
        record("course_add", result)
    }

    pub fn rename_course(
        &self,
        institution_name: &str,
        new_name: &str,
        old_name: &str,
    ) -> ServiceResult<()> {
        let result = normalize_name(new_name, "newCourseName")
            .and_then(|_| normalize_name(old_name, "oldCourseName"))
            .and_then(|_| self.require_institution(institution_name))
            .and_then(|institution_name| {
                self.courses.rename(&institution_name, new_name, old_name)
            });
        record("course_rename", result)
    }

    /// Deletes a course that has no students.
    pub fn delete_course(&self, course_name: &str, institution_name: &str) -> ServiceResult<()> {
        let result = normalize_name(course_name, "courseName").and_then(|course_name| {
            let institution_name = normalize_name(institution_name, "institutionName")?;
            let tx = immediate_transaction(self.conn)?;
            if !self
                .students
                .has_no_students(&course_name, &institution_name)?
            {
                return Err(ServiceError::DependencyConflict(EntityRef::course(
                    course_name,
                    institution_name,
                )));
            }
            self.courses.delete(&course_name, &institution_name)?;
            tx.commit()?;
            Ok(())
        });
        record("course_delete", result)
    }

    // Students

    pub fn add_student(
        &self,
        student_name: &str,
        course_name: &str,
        institution_name: &str,
    ) -> ServiceResult<Student> {
        record(
            "student_add",
            self.students.add(student_name, course_name, institution_name),
        )
    }

    pub fn delete_student(&self, student_id: StudentId) -> ServiceResult<()> {
        record("student_delete", self.students.delete(student_id))
    }

    pub fn rename_student(&self, student_id: StudentId, new_name: &str) -> ServiceResult<()> {
        record("student_rename", self.students.rename(student_id, new_name))
    }

    pub fn change_course(
        &self,
        student_id: StudentId,
        new_course_name: &str,
    ) -> ServiceResult<Student> {
        let result = immediate_transaction(self.conn)
            .map_err(ServiceError::from)
            .and_then(|tx| {
                let student = self.students.change_course(student_id, new_course_name)?;
                tx.commit()?;
                Ok(student)
            });
        record("student_change_course", result)
    }

    pub fn transfer_student(
        &self,
        student_id: StudentId,
        new_institution_name: &str,
        new_course_name: &str,
    ) -> ServiceResult<Student> {
        let result = immediate_transaction(self.conn)
            .map_err(ServiceError::from)
            .and_then(|tx| {
                let student =
                    self.students
                        .transfer(student_id, new_institution_name, new_course_name)?;
                tx.commit()?;
                Ok(student)
            });
        record("student_transfer", result)
    }

    pub fn list_students(
        &self,
        institution_name: &str,
        page: PageRequest,
    ) -> ServiceResult<Vec<Student>> {
        let institution_name = self.require_institution(institution_name)?;
        self.students.list_by_institution(&institution_name, page)
    }

    pub fn search_students(
        &self,
        keyword: &str,
        institution_name: &str,
        page: PageRequest,
    ) -> ServiceResult<Vec<Student>> {
        let institution_name = self.require_institution(institution_name)?;
        self.students
            .search_by_institution(keyword, &institution_name, page)
    }

    pub fn filter_students(
        &self,
        institution_name: &str,
        course_name: &str,
        page: PageRequest,
    ) -> ServiceResult<Vec<Student>> {
        let institution_name = normalize_name(institution_name, "institutionName")?;
        let course_name = normalize_name(course_name, "courseName")?;
        if !self.courses.has_course(&course_name, &institution_name)? {
            return Err(ServiceError::NotFound(EntityRef::course(
                course_name,
                institution_name,
            )));
        }
        self.students
            .filter_by_institution_and_course(&institution_name, &course_name, page)
    }

    /// Normalizes an institution name and checks that it exists.
    fn require_institution(&self, institution_name: &str) -> ServiceResult<String> {
        let institution_name = normalize_name(institution_name, "institutionName")?;
        if !self.institutions.exists(&institution_name)? {
            return Err(ServiceError::NotFound(EntityRef::institution(
                institution_name,
            )));
        }
        Ok(institution_name)
    }

    fn next_sort(&self, session_id: Option<&str>, key: &str) -> ServiceResult<SortDirection> {
        match session_key(session_id) {
            Some(session_id) => Ok(self.sessions.load_session(session_id)?.next_sort(key)),
            None => Ok(SortDirection::Ascending),
        }
    }

    fn remember_sort(
        &self,
        session_id: Option<&str>,
        key: &str,
        direction: SortDirection,
    ) -> ServiceResult<()> {
        if let Some(session_id) = session_key(session_id) {
            self.sessions
                .store_session_value(session_id, key, direction.as_str())?;
        }
        Ok(())
    }
}

fn session_key(session_id: Option<&str>) -> Option<&str> {
    session_id.map(str::trim).filter(|id| !id.is_empty())
}

fn record<T>(event: &'static str, result: ServiceResult<T>) -> ServiceResult<T> {
    match &result {
        Ok(_) => info!("event={event} module=roster status=ok"),
        Err(err @ ServiceError::Repo(_)) => warn!(
            "event={event} module=roster status=error error_code={} error={err}",
            err.code()
        ),
        Err(err) => info!(
            "event={event} module=roster status=rejected error_code={}",
            err.code()
        ),
    }
    result
}
