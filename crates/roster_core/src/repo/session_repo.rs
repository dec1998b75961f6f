//! Session repository contract and SQLite implementation.
//!
//! # Invariants
//! - Values are keyed by `(session_id, key)`; storing a key again replaces it.
//! - Session ids are opaque; an id never seen before loads an empty session.

use crate::repo::{ensure_roster_schema, RepoResult};
use crate::session::Session;
use rusqlite::{params, Connection};

/// Repository interface for client session state.
pub trait SessionRepository {
    fn load_session(&self, session_id: &str) -> RepoResult<Session>;
    fn store_session_value(&self, session_id: &str, key: &str, value: &str) -> RepoResult<()>;
}

/// SQLite-backed session repository.
#[derive(Clone, Copy)]
pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_roster_schema(conn)?;
        Ok(Self { conn })
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn load_session(&self, session_id: &str) -> RepoResult<Session> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM sessions WHERE session_id = ?1;")?;
        let mut rows = stmt.query([session_id])?;
        let mut session = Session::new();
        while let Some(row) = rows.next()? {
            session.set(row.get::<_, String>(0)?, row.get::<_, String>(1)?);
        }
        Ok(session)
    }

    fn store_session_value(&self, session_id: &str, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO sessions (session_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (session_id, key) DO UPDATE
             SET value = excluded.value,
                 updated_at = (strftime('%s', 'now') * 1000);",
            params![session_id, key, value],
        )?;
        Ok(())
    }
}
