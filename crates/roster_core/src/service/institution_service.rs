//! Institution store.
//!
//! # Responsibility
//! - Add, list, search, sort, rename and delete institutions.
//!
//! # Invariants
//! - Names are unique case-insensitively.
//! - Deletion does not check for courses; that gate belongs to the
//!   orchestration layer.

use crate::model::institution::Institution;
use crate::model::listing::SortDirection;
use crate::repo::institution_repo::InstitutionRepository;
use crate::repo::EntityRef;
use crate::service::{normalize_name, ServiceError, ServiceResult};

pub struct InstitutionService<R: InstitutionRepository> {
    repo: R,
}

impl<R: InstitutionRepository> InstitutionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds an institution, failing with `Conflict` on a duplicate name.
    pub fn add(&self, name: &str) -> ServiceResult<Institution> {
        let name = normalize_name(name, "institutionName")?;
        if self.repo.institution_exists(&name)? {
            return Err(ServiceError::Conflict(EntityRef::institution(name)));
        }

        let institution = Institution::new(name);
        self.repo.create_institution(&institution)?;
        Ok(institution)
    }

    /// Lists all institutions in insertion order.
    pub fn list(&self) -> ServiceResult<Vec<Institution>> {
        Ok(self.repo.list_institutions(None)?)
    }

    /// Case-insensitive substring search; an empty keyword matches all.
    pub fn search(&self, keyword: &str) -> ServiceResult<Vec<Institution>> {
        Ok(self.repo.search_institutions(keyword.trim())?)
    }

    pub fn sort_by_name(&self, direction: SortDirection) -> ServiceResult<Vec<Institution>> {
        Ok(self.repo.list_institutions(Some(direction))?)
    }

    /// Renames an institution.
    ///
    /// `NotFound` when `old_name` is missing, `Conflict` when `new_name` is
    /// taken by another institution. Case-only renames are allowed.
    pub fn rename(&self, old_name: &str, new_name: &str) -> ServiceResult<()> {
        let old_name = normalize_name(old_name, "oldInstitutionName")?;
        let new_name = normalize_name(new_name, "newInstitutionName")?;
        self.repo.rename_institution(&old_name, &new_name)?;
        Ok(())
    }

    pub fn delete(&self, name: &str) -> ServiceResult<()> {
        let name = normalize_name(name, "institutionName")?;
        self.repo.delete_institution(&name)?;
        Ok(())
    }

    pub fn exists(&self, name: &str) -> ServiceResult<bool> {
        Ok(self.repo.institution_exists(name.trim())?)
    }

    pub fn get(&self, name: &str) -> ServiceResult<Option<Institution>> {
        Ok(self.repo.get_institution(name.trim())?)
    }
}
