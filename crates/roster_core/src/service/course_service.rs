//! Course store.
//!
//! # Responsibility
//! - Add, list, search, sort, rename and delete courses of one institution.
//! - Expose the predicates used by enrollment and delete gates.
//!
//! # Invariants
//! - Operations are scoped to one institution; reporting a missing
//!   institution is the caller's job, except for `add` where the storage
//!   layer cannot attach a course to nothing.
//! - Deletion does not check for students; that gate belongs to the
//!   orchestration layer.

use crate::model::course::Course;
use crate::model::listing::SortDirection;
use crate::repo::course_repo::CourseRepository;
use crate::repo::EntityRef;
use crate::service::{normalize_name, ServiceError, ServiceResult};

pub struct CourseService<R: CourseRepository> {
    repo: R,
}

impl<R: CourseRepository> CourseService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_by_institution(&self, institution_name: &str) -> ServiceResult<Vec<Course>> {
        Ok(self.repo.list_courses(institution_name.trim(), None)?)
    }

    /// Case-insensitive substring search scoped to one institution.
    pub fn search(&self, keyword: &str, institution_name: &str) -> ServiceResult<Vec<Course>> {
        Ok(self
            .repo
            .search_courses(institution_name.trim(), keyword.trim())?)
    }

    pub fn sort_by_name(
        &self,
        institution_name: &str,
        direction: SortDirection,
    ) -> ServiceResult<Vec<Course>> {
        Ok(self
            .repo
            .list_courses(institution_name.trim(), Some(direction))?)
    }

    /// Adds a course, failing with `Conflict` when the institution already
    /// offers a course of that name.
    pub fn add(&self, course_name: &str, institution_name: &str) -> ServiceResult<Course> {
        let course_name = normalize_name(course_name, "courseName")?;
        let institution_name = normalize_name(institution_name, "institutionName")?;
        if self.repo.course_exists(&course_name, &institution_name)? {
            return Err(ServiceError::Conflict(EntityRef::course(
                course_name,
                institution_name,
            )));
        }
        Ok(self.repo.create_course(&course_name, &institution_name)?)
    }

    /// Renames a course within its institution. Case-only renames are allowed.
    pub fn rename(
        &self,
        institution_name: &str,
        new_name: &str,
        old_name: &str,
    ) -> ServiceResult<()> {
        let institution_name = normalize_name(institution_name, "institutionName")?;
        let new_name = normalize_name(new_name, "newCourseName")?;
        let old_name = normalize_name(old_name, "oldCourseName")?;
        self.repo
            .rename_course(&institution_name, &old_name, &new_name)?;
        Ok(())
    }

    pub fn delete(&self, course_name: &str, institution_name: &str) -> ServiceResult<()> {
        let course_name = normalize_name(course_name, "courseName")?;
        let institution_name = normalize_name(institution_name, "institutionName")?;
        self.repo.delete_course(&course_name, &institution_name)?;
        Ok(())
    }

    pub fn get_if_exists(
        &self,
        course_name: &str,
        institution_name: &str,
    ) -> ServiceResult<Option<Course>> {
        Ok(self
            .repo
            .get_course(course_name.trim(), institution_name.trim())?)
    }

    pub fn has_no_courses(&self, institution_name: &str) -> ServiceResult<bool> {
        Ok(!self.repo.institution_has_courses(institution_name.trim())?)
    }

    pub fn has_course(&self, course_name: &str, institution_name: &str) -> ServiceResult<bool> {
        Ok(self
            .repo
            .course_exists(course_name.trim(), institution_name.trim())?)
    }
}
