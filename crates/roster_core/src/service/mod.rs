//! Store services and the orchestration layer above them.
//!
//! # Responsibility
//! - Implement the institution, course and student store operations over
//!   repository contracts.
//! - Compose the stores' predicates into cross-entity gates
//!   (`roster_service`).
//!
//! # Invariants
//! - Required names are trimmed and rejected when blank before any storage
//!   access.
//! - Service errors carry the entity they concern, never raw SQL details,
//!   except for `Repo` transport failures.

use crate::db::DbError;
use crate::repo::{EntityRef, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod course_service;
pub mod institution_service;
pub mod roster_service;
pub mod student_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error taxonomy surfaced by stores and the orchestration layer.
#[derive(Debug)]
pub enum ServiceError {
    /// Required field is missing or blank. Carries the field name.
    InvalidInput(&'static str),
    /// Referenced entity does not exist.
    NotFound(EntityRef),
    /// Write would duplicate a unique name.
    Conflict(EntityRef),
    /// Delete blocked by existing children.
    DependencyConflict(EntityRef),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl ServiceError {
    /// Short stable code used in diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::DependencyConflict(_) => "dependency_conflict",
            Self::Repo(RepoError::Db(err)) if err.is_busy() => "storage_busy",
            Self::Repo(_) => "storage",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(field) => write!(f, "`{field}` must be provided and not blank"),
            Self::NotFound(entity) => write!(f, "{entity} does not exist"),
            Self::Conflict(entity) => write!(f, "{entity} already exists"),
            Self::DependencyConflict(entity) => {
                let dependents = match entity {
                    EntityRef::Institution { .. } => "courses",
                    EntityRef::Course { .. } => "students",
                    EntityRef::Student { .. } => "records",
                };
                write!(f, "{entity} still has {dependents} assigned to it")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(entity) => Self::NotFound(entity),
            RepoError::Conflict(entity) => Self::Conflict(entity),
            RepoError::DependencyConflict(entity) => Self::DependencyConflict(entity),
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

/// Trims a required name, rejecting blank input.
pub fn normalize_name(value: &str, field: &'static str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, ServiceError};
    use crate::repo::{EntityRef, RepoError};

    #[test]
    fn normalize_name_trims_and_rejects_blank() {
        assert_eq!(normalize_name("  Acme ", "name").unwrap(), "Acme");
        let err = normalize_name(" \t", "institutionName").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput("institutionName")));
    }

    #[test]
    fn semantic_repo_errors_are_lifted() {
        let err = ServiceError::from(RepoError::Conflict(EntityRef::institution("Acme")));
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(err.to_string(), "institution `Acme` already exists");

        let err = ServiceError::from(RepoError::DependencyConflict(EntityRef::course(
            "CS101", "Acme",
        )));
        assert_eq!(
            err.to_string(),
            "course `CS101` in institution `Acme` still has students assigned to it"
        );
    }

    #[test]
    fn lock_contention_is_coded_apart_from_other_storage_failures() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert_eq!(ServiceError::from(busy).code(), "storage_busy");

        let other = ServiceError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(other.code(), "storage");
    }
}
