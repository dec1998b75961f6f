//! Course repository contract and SQLite implementation.
//!
//! # Invariants
//! - Courses are always addressed by `(course name, institution name)`, both
//!   compared case-insensitively.
//! - A course name is unique within its institution.
//! - Deleting a course that still has students fails with
//!   `DependencyConflict` (foreign key `RESTRICT`).

use crate::db::{immediate_transaction, same_name};
use crate::model::course::{Course, CourseId};
use crate::model::listing::SortDirection;
use crate::repo::{
    classify_write_error, ensure_roster_schema, exists, parse_uuid, EntityRef, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const COURSE_SELECT_SQL: &str = "SELECT
    c.uuid AS uuid,
    c.name AS name,
    c.institution_uuid AS institution_uuid,
    i.name AS institution_name
FROM courses c
INNER JOIN institutions i ON i.uuid = c.institution_uuid";

/// Repository interface for course persistence.
pub trait CourseRepository {
    /// Creates a course under an existing institution.
    ///
    /// Fails with `NotFound` when the institution does not exist and with
    /// `Conflict` when the institution already has a course of that name.
    fn create_course(&self, course_name: &str, institution_name: &str) -> RepoResult<Course>;
    fn get_course(&self, course_name: &str, institution_name: &str) -> RepoResult<Option<Course>>;
    fn course_exists(&self, course_name: &str, institution_name: &str) -> RepoResult<bool>;
    fn institution_has_courses(&self, institution_name: &str) -> RepoResult<bool>;
    /// Lists courses of one institution; `None` keeps insertion order.
    fn list_courses(
        &self,
        institution_name: &str,
        order: Option<SortDirection>,
    ) -> RepoResult<Vec<Course>>;
    fn search_courses(&self, institution_name: &str, keyword: &str) -> RepoResult<Vec<Course>>;
    fn rename_course(
        &self,
        institution_name: &str,
        old_name: &str,
        new_name: &str,
    ) -> RepoResult<()>;
    fn delete_course(&self, course_name: &str, institution_name: &str) -> RepoResult<()>;
}

/// SQLite-backed course repository.
#[derive(Clone, Copy)]
pub struct SqliteCourseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourseRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_roster_schema(conn)?;
        Ok(Self { conn })
    }
}

impl CourseRepository for SqliteCourseRepository<'_> {
    fn create_course(&self, course_name: &str, institution_name: &str) -> RepoResult<Course> {
        let course_id = Uuid::new_v4();
        let changed = self
            .conn
            .execute(
                "INSERT INTO courses (uuid, institution_uuid, name)
                 SELECT ?1, uuid, ?2
                 FROM institutions
                 WHERE name = ?3 COLLATE UNICASE;",
                params![course_id.to_string(), course_name, institution_name],
            )
            .map_err(|err| {
                classify_write_error(err, EntityRef::course(course_name, institution_name))
            })?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::institution(
                institution_name,
            )));
        }

        load_course_by_id(self.conn, course_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("course `{course_id}` missing after insert"))
        })
    }

    fn get_course(&self, course_name: &str, institution_name: &str) -> RepoResult<Option<Course>> {
        find_course(self.conn, course_name, institution_name)
    }

    fn course_exists(&self, course_name: &str, institution_name: &str) -> RepoResult<bool> {
        course_exists_in(self.conn, course_name, institution_name)
    }

    fn institution_has_courses(&self, institution_name: &str) -> RepoResult<bool> {
        exists(
            self.conn,
            "SELECT EXISTS(
                SELECT 1
                FROM courses c
                INNER JOIN institutions i ON i.uuid = c.institution_uuid
                WHERE i.name = ?1 COLLATE UNICASE
            );",
            [institution_name],
        )
    }

    fn list_courses(
        &self,
        institution_name: &str,
        order: Option<SortDirection>,
    ) -> RepoResult<Vec<Course>> {
        let order_clause = match order {
            Some(direction) => format!(
                "c.name COLLATE UNICASE {}, c.uuid ASC",
                direction.sql_keyword()
            ),
            None => "c.rowid ASC".to_string(),
        };
        let mut stmt = self.conn.prepare(&format!(
            "{COURSE_SELECT_SQL}
             WHERE i.name = ?1 COLLATE UNICASE
             ORDER BY {order_clause};"
        ))?;
        let rows = stmt.query([institution_name])?;
        collect_courses(rows)
    }

    fn search_courses(&self, institution_name: &str, keyword: &str) -> RepoResult<Vec<Course>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COURSE_SELECT_SQL}
             WHERE i.name = ?1 COLLATE UNICASE
               AND (?2 = '' OR instr(casefold(c.name), casefold(?2)) > 0)
             ORDER BY c.rowid ASC;"
        ))?;
        let rows = stmt.query(params![institution_name, keyword])?;
        collect_courses(rows)
    }

    fn rename_course(
        &self,
        institution_name: &str,
        old_name: &str,
        new_name: &str,
    ) -> RepoResult<()> {
        let tx = immediate_transaction(self.conn)?;
        let current = find_course(&tx, old_name, institution_name)?
            .ok_or_else(|| RepoError::NotFound(EntityRef::course(old_name, institution_name)))?;

        if !same_name(&current.name, new_name)
            && course_exists_in(&tx, new_name, institution_name)?
        {
            return Err(RepoError::Conflict(EntityRef::course(
                new_name,
                institution_name,
            )));
        }

        tx.execute(
            "UPDATE courses
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![current.id.to_string(), new_name],
        )
        .map_err(|err| classify_write_error(err, EntityRef::course(new_name, institution_name)))?;

        tx.commit()?;
        Ok(())
    }

    fn delete_course(&self, course_name: &str, institution_name: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM courses
                 WHERE name = ?1 COLLATE UNICASE
                   AND institution_uuid IN (
                     SELECT uuid FROM institutions WHERE name = ?2 COLLATE UNICASE
                   );",
                params![course_name, institution_name],
            )
            .map_err(|err| {
                classify_write_error(err, EntityRef::course(course_name, institution_name))
            })?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::course(
                course_name,
                institution_name,
            )));
        }
        Ok(())
    }
}

fn find_course(
    conn: &Connection,
    course_name: &str,
    institution_name: &str,
) -> RepoResult<Option<Course>> {
    let mut stmt = conn.prepare(&format!(
        "{COURSE_SELECT_SQL}
         WHERE c.name = ?1 COLLATE UNICASE
           AND i.name = ?2 COLLATE UNICASE;"
    ))?;
    let mut rows = stmt.query(params![course_name, institution_name])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_course_row(row)?));
    }
    Ok(None)
}

fn load_course_by_id(conn: &Connection, course_id: CourseId) -> RepoResult<Option<Course>> {
    let mut stmt = conn.prepare(&format!("{COURSE_SELECT_SQL} WHERE c.uuid = ?1;"))?;
    let mut rows = stmt.query([course_id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_course_row(row)?));
    }
    Ok(None)
}

fn course_exists_in(
    conn: &Connection,
    course_name: &str,
    institution_name: &str,
) -> RepoResult<bool> {
    exists(
        conn,
        "SELECT EXISTS(
            SELECT 1
            FROM courses c
            INNER JOIN institutions i ON i.uuid = c.institution_uuid
            WHERE c.name = ?1 COLLATE UNICASE
              AND i.name = ?2 COLLATE UNICASE
        );",
        params![course_name, institution_name],
    )
}

fn collect_courses(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<Course>> {
    let mut courses = Vec::new();
    while let Some(row) = rows.next()? {
        courses.push(parse_course_row(row)?);
    }
    Ok(courses)
}

fn parse_course_row(row: &Row<'_>) -> RepoResult<Course> {
    let uuid_text: String = row.get("uuid")?;
    let institution_text: String = row.get("institution_uuid")?;
    Ok(Course {
        id: parse_uuid(&uuid_text, "courses.uuid")?,
        name: row.get("name")?,
        institution_id: parse_uuid(&institution_text, "courses.institution_uuid")?,
        institution_name: row.get("institution_name")?,
    })
}
