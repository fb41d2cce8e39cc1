// ==========================================
// Competition Scheduler - Session repository
// ==========================================
// sessions table -> SessionRecord (converted by engine::adapter)
// ==========================================

use crate::domain::records::SessionRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct SessionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SessionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, session: &SessionRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO sessions (
                session_id, competition_id, session_number, session_name,
                session_date, start_time, end_time, max_entries
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                session.session_id,
                session.competition_id,
                session.session_number,
                session.session_name,
                session.session_date,
                session.start_time,
                session.end_time,
                session.max_entries,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, session_id: &str) -> RepositoryResult<Option<SessionRecord>> {
        let conn = self.get_conn()?;
        let session = conn
            .query_row(
                r#"
                SELECT session_id, competition_id, session_number, session_name,
                       session_date, start_time, end_time, max_entries
                FROM sessions
                WHERE session_id = ?1
                "#,
                params![session_id],
                map_row,
            )
            .optional()?;
        Ok(session)
    }

    /// All sessions of a competition in schedule order
    /// (start time, then session number).
    pub fn find_by_competition(&self, competition_id: &str) -> RepositoryResult<Vec<SessionRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT session_id, competition_id, session_number, session_name,
                   session_date, start_time, end_time, max_entries
            FROM sessions
            WHERE competition_id = ?1
            ORDER BY start_time, session_number, session_id
            "#,
        )?;

        let sessions = stmt
            .query_map(params![competition_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(sessions)
    }

    /// session_id -> number of entries currently assigned
    pub fn assigned_counts(&self, competition_id: &str) -> RepositoryResult<HashMap<String, u32>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT session_id, COUNT(*)
            FROM entries
            WHERE competition_id = ?1 AND session_id IS NOT NULL
            GROUP BY session_id
            "#,
        )?;

        let rows = stmt
            .query_map(params![competition_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows
            .into_iter()
            .map(|(id, n)| (id, u32::try_from(n).unwrap_or(u32::MAX)))
            .collect())
    }
}

fn map_row(row: &Row) -> SqliteResult<SessionRecord> {
    Ok(SessionRecord {
        session_id: row.get(0)?,
        competition_id: row.get(1)?,
        session_number: row.get(2)?,
        session_name: row.get(3)?,
        session_date: row.get(4)?,
        start_time: row.get(5)?,
        end_time: row.get(6)?,
        max_entries: row.get(7)?,
    })
}
