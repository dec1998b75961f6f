//! Repository layer: the minimal persistence interface under the stores.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity.
//! - Isolate SQLite query details from store and orchestration logic.
//! - Translate constraint violations into semantic errors.
//!
//! # Invariants
//! - Repositories only accept connections at the latest schema version.
//! - Existence checks are `EXISTS` queries, never list materialization.
//! - Read-then-write sequences run inside one immediate transaction.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::student::StudentId;
use rusqlite::{ffi, Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod course_repo;
pub mod institution_repo;
pub mod session_repo;
pub mod student_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Entity addressed by a failed lookup or a violated constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    Institution { name: String },
    Course { name: String, institution: String },
    Student { id: StudentId },
}

impl EntityRef {
    pub fn institution(name: impl Into<String>) -> Self {
        Self::Institution { name: name.into() }
    }

    pub fn course(name: impl Into<String>, institution: impl Into<String>) -> Self {
        Self::Course {
            name: name.into(),
            institution: institution.into(),
        }
    }

    pub fn student(id: StudentId) -> Self {
        Self::Student { id }
    }
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Institution { name } => write!(f, "institution `{name}`"),
            Self::Course { name, institution } => {
                write!(f, "course `{name}` in institution `{institution}`")
            }
            Self::Student { id } => write!(f, "student `{id}`"),
        }
    }
}

/// Repository error shared by all roster repositories.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Addressed row does not exist.
    NotFound(EntityRef),
    /// Write would break a case-insensitive uniqueness rule.
    Conflict(EntityRef),
    /// Delete refused because dependent rows still reference the target.
    DependencyConflict(EntityRef),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::Conflict(entity) => write!(f, "{entity} already exists"),
            Self::DependencyConflict(entity) => {
                write!(f, "{entity} is still referenced by dependent records")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "roster repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "roster repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted roster data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Maps SQLite constraint failures of a write onto semantic repository errors.
///
/// Unique violations become `Conflict`, foreign-key violations become
/// `DependencyConflict`; anything else stays a transport error.
pub(crate) fn classify_write_error(err: rusqlite::Error, entity: EntityRef) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return RepoError::Conflict(entity);
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return RepoError::DependencyConflict(entity);
                }
                _ => {}
            }
        }
    }
    err.into()
}

/// Verifies the connection carries the migrated roster schema.
pub(crate) fn ensure_roster_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["institutions", "courses", "students", "sessions"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn exists(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> RepoResult<bool> {
    let found: i64 = conn.query_row(sql, params, |row| row.get(0))?;
    Ok(found == 1)
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    exists(
        conn,
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
    )
}
