//! Student repository contract and SQLite implementation.
//!
//! # Invariants
//! - Every student row references an existing course (foreign key).
//! - Listings are paged and ordered by `name COLLATE UNICASE ASC, uuid ASC`.
//! - Students have no dependents; deletes never cascade.

use crate::model::course::Course;
use crate::model::listing::PageRequest;
use crate::model::student::{Student, StudentId};
use crate::repo::{
    classify_write_error, ensure_roster_schema, exists, parse_uuid, EntityRef, RepoError,
    RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const STUDENT_SELECT_SQL: &str = "SELECT
    s.uuid AS uuid,
    s.name AS name,
    s.course_uuid AS course_uuid,
    c.name AS course_name,
    i.name AS institution_name
FROM students s
INNER JOIN courses c ON c.uuid = s.course_uuid
INNER JOIN institutions i ON i.uuid = c.institution_uuid";

/// Query options for paged student listings within one institution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentListQuery {
    /// Institution scope, matched case-insensitively.
    pub institution_name: String,
    /// Optional exact course filter, matched case-insensitively.
    pub course_name: Option<String>,
    /// Optional substring matched against id, student name and course name.
    pub keyword: Option<String>,
    pub page: PageRequest,
}

/// Repository interface for student persistence.
pub trait StudentRepository {
    /// Creates one student enrolled in `course` and returns the stored row.
    fn create_student(&self, name: &str, course: &Course) -> RepoResult<Student>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn rename_student(&self, id: StudentId, name: &str) -> RepoResult<()>;
    /// Repoints the course reference of one student.
    fn reassign_course(&self, id: StudentId, course: &Course) -> RepoResult<()>;
    fn delete_student(&self, id: StudentId) -> RepoResult<()>;
    fn course_has_students(&self, course_name: &str, institution_name: &str) -> RepoResult<bool>;
    fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>>;
}

/// SQLite-backed student repository.
#[derive(Clone, Copy)]
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_roster_schema(conn)?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, name: &str, course: &Course) -> RepoResult<Student> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO students (uuid, name, course_uuid) VALUES (?1, ?2, ?3);",
                params![id.to_string(), name, course.id.to_string()],
            )
            .map_err(|err| course_reference_error(err, id, course))?;

        self.get_student(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("student `{id}` missing after insert")))
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE s.uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }
        Ok(None)
    }

    fn rename_student(&self, id: StudentId, name: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE students
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), name],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::student(id)));
        }
        Ok(())
    }

    fn reassign_course(&self, id: StudentId, course: &Course) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE students
                 SET course_uuid = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;",
                params![id.to_string(), course.id.to_string()],
            )
            .map_err(|err| course_reference_error(err, id, course))?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::student(id)));
        }
        Ok(())
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::student(id)));
        }
        Ok(())
    }

    fn course_has_students(&self, course_name: &str, institution_name: &str) -> RepoResult<bool> {
        exists(
            self.conn,
            "SELECT EXISTS(
                SELECT 1
                FROM students s
                INNER JOIN courses c ON c.uuid = s.course_uuid
                INNER JOIN institutions i ON i.uuid = c.institution_uuid
                WHERE c.name = ?1 COLLATE UNICASE
                  AND i.name = ?2 COLLATE UNICASE
            );",
            params![course_name, institution_name],
        )
    }

    fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>> {
        let mut sql = format!("{STUDENT_SELECT_SQL} WHERE i.name = ? COLLATE UNICASE");
        let mut bind_values: Vec<Value> = vec![Value::Text(query.institution_name.clone())];

        if let Some(course_name) = query.course_name.as_ref() {
            sql.push_str(" AND c.name = ? COLLATE UNICASE");
            bind_values.push(Value::Text(course_name.clone()));
        }

        if let Some(keyword) = query.keyword.as_ref().filter(|value| !value.is_empty()) {
            sql.push_str(" AND instr(casefold(s.uuid || ' ' || s.name || ' ' || c.name), casefold(?)) > 0");
            bind_values.push(Value::Text(keyword.clone()));
        }

        sql.push_str(" ORDER BY s.name COLLATE UNICASE ASC, s.uuid ASC LIMIT ? OFFSET ?");
        bind_values.push(Value::Integer(i64::from(query.page.limit())));
        bind_values.push(Value::Integer(
            i64::try_from(query.page.offset()).unwrap_or(i64::MAX),
        ));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }
}

/// A dangling course reference surfaces as the course not being found.
fn course_reference_error(err: rusqlite::Error, id: StudentId, course: &Course) -> RepoError {
    match classify_write_error(err, EntityRef::student(id)) {
        RepoError::DependencyConflict(_) => RepoError::NotFound(EntityRef::course(
            course.name.as_str(),
            course.institution_name.as_str(),
        )),
        other => other,
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let uuid_text: String = row.get("uuid")?;
    let course_text: String = row.get("course_uuid")?;
    Ok(Student {
        id: parse_uuid(&uuid_text, "students.uuid")?,
        name: row.get("name")?,
        course_id: parse_uuid(&course_text, "students.course_uuid")?,
        course_name: row.get("course_name")?,
        institution_name: row.get("institution_name")?,
    })
}
