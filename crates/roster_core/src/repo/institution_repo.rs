//! Institution repository contract and SQLite implementation.
//!
//! # Invariants
//! - Names are unique case-insensitively (`COLLATE UNICASE` unique column).
//! - Renames check and write inside one immediate transaction.
//! - Deleting an institution that still owns courses fails with
//!   `DependencyConflict` (foreign key `RESTRICT`).

use crate::db::{immediate_transaction, same_name};
use crate::model::institution::{Institution, InstitutionId};
use crate::model::listing::SortDirection;
use crate::repo::{
    classify_write_error, ensure_roster_schema, exists, parse_uuid, EntityRef, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, Row};

const INSTITUTION_SELECT_SQL: &str = "SELECT uuid, name FROM institutions";

/// Repository interface for institution persistence.
pub trait InstitutionRepository {
    fn create_institution(&self, institution: &Institution) -> RepoResult<InstitutionId>;
    fn get_institution(&self, name: &str) -> RepoResult<Option<Institution>>;
    fn institution_exists(&self, name: &str) -> RepoResult<bool>;
    /// Lists all institutions; `None` keeps insertion order.
    fn list_institutions(&self, order: Option<SortDirection>) -> RepoResult<Vec<Institution>>;
    /// Case-insensitive substring match on the name.
    fn search_institutions(&self, keyword: &str) -> RepoResult<Vec<Institution>>;
    /// Renames `old_name` to `new_name`.
    ///
    /// A new name equal to the old one (ignoring case) is never a conflict.
    fn rename_institution(&self, old_name: &str, new_name: &str) -> RepoResult<()>;
    fn delete_institution(&self, name: &str) -> RepoResult<()>;
}

/// SQLite-backed institution repository.
#[derive(Clone, Copy)]
pub struct SqliteInstitutionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteInstitutionRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_roster_schema(conn)?;
        Ok(Self { conn })
    }
}

impl InstitutionRepository for SqliteInstitutionRepository<'_> {
    fn create_institution(&self, institution: &Institution) -> RepoResult<InstitutionId> {
        self.conn
            .execute(
                "INSERT INTO institutions (uuid, name) VALUES (?1, ?2);",
                params![institution.id.to_string(), institution.name.as_str()],
            )
            .map_err(|err| classify_write_error(err, EntityRef::institution(&institution.name)))?;
        Ok(institution.id)
    }

    fn get_institution(&self, name: &str) -> RepoResult<Option<Institution>> {
        find_institution(self.conn, name)
    }

    fn institution_exists(&self, name: &str) -> RepoResult<bool> {
        institution_exists_in(self.conn, name)
    }

    fn list_institutions(&self, order: Option<SortDirection>) -> RepoResult<Vec<Institution>> {
        let order_clause = match order {
            Some(direction) => format!("name COLLATE UNICASE {}, uuid ASC", direction.sql_keyword()),
            None => "rowid ASC".to_string(),
        };
        let mut stmt = self
            .conn
            .prepare(&format!("{INSTITUTION_SELECT_SQL} ORDER BY {order_clause};"))?;
        let mut rows = stmt.query([])?;
        let mut institutions = Vec::new();
        while let Some(row) = rows.next()? {
            institutions.push(parse_institution_row(row)?);
        }
        Ok(institutions)
    }

    fn search_institutions(&self, keyword: &str) -> RepoResult<Vec<Institution>> {
        let mut stmt = self.conn.prepare(&format!(
            "{INSTITUTION_SELECT_SQL}
             WHERE ?1 = '' OR instr(casefold(name), casefold(?1)) > 0
             ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query([keyword])?;
        let mut institutions = Vec::new();
        while let Some(row) = rows.next()? {
            institutions.push(parse_institution_row(row)?);
        }
        Ok(institutions)
    }

    fn rename_institution(&self, old_name: &str, new_name: &str) -> RepoResult<()> {
        let tx = immediate_transaction(self.conn)?;
        let current = find_institution(&tx, old_name)?
            .ok_or_else(|| RepoError::NotFound(EntityRef::institution(old_name)))?;

        if !same_name(&current.name, new_name) && institution_exists_in(&tx, new_name)? {
            return Err(RepoError::Conflict(EntityRef::institution(new_name)));
        }

        tx.execute(
            "UPDATE institutions
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![current.id.to_string(), new_name],
        )
        .map_err(|err| classify_write_error(err, EntityRef::institution(new_name)))?;

        tx.commit()?;
        Ok(())
    }

    fn delete_institution(&self, name: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM institutions WHERE name = ?1 COLLATE UNICASE;",
                [name],
            )
            .map_err(|err| classify_write_error(err, EntityRef::institution(name)))?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::institution(name)));
        }
        Ok(())
    }
}

fn find_institution(conn: &Connection, name: &str) -> RepoResult<Option<Institution>> {
    let mut stmt = conn.prepare(&format!(
        "{INSTITUTION_SELECT_SQL} WHERE name = ?1 COLLATE UNICASE;"
    ))?;
    let mut rows = stmt.query([name])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_institution_row(row)?));
    }
    Ok(None)
}

fn institution_exists_in(conn: &Connection, name: &str) -> RepoResult<bool> {
    exists(
        conn,
        "SELECT EXISTS(
            SELECT 1 FROM institutions WHERE name = ?1 COLLATE UNICASE
        );",
        [name],
    )
}

fn parse_institution_row(row: &Row<'_>) -> RepoResult<Institution> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Institution {
        id: parse_uuid(&uuid_text, "institutions.uuid")?,
        name: row.get("name")?,
    })
}
