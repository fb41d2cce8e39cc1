// ==========================================
// Competition Scheduler - Entry repository
// ==========================================
// entries + entry_participants tables.
// Read side only; schedule writes go through ScheduleWriteRepository.
// ==========================================

use crate::domain::records::{EntryRecord, ParticipantRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const ENTRY_COLUMNS: &str = r#"
    entry_id, competition_id, title, studio_id, studio_name,
    category_id, category_name, age_group_id, age_group_name, entry_size_category_id,
    duration_minutes, warm_up_minutes, session_id, performance_time, running_order,
    entry_number, entry_suffix
"#;

pub struct EntryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EntryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Writes (registration side)
    // ==========================================

    pub fn insert(&self, entry: &EntryRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO entries ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                ENTRY_COLUMNS
            ),
            params![
                entry.entry_id,
                entry.competition_id,
                entry.title,
                entry.studio_id,
                entry.studio_name,
                entry.category_id,
                entry.category_name,
                entry.age_group_id,
                entry.age_group_name,
                entry.entry_size_category_id,
                entry.duration_minutes,
                entry.warm_up_minutes,
                entry.session_id,
                entry.performance_time,
                entry.running_order,
                entry.entry_number,
                entry.entry_suffix,
            ],
        )?;
        Ok(())
    }

    /// Insert roster rows in one transaction.
    pub fn batch_insert_participants(&self, participants: &[ParticipantRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for p in participants {
            count += tx.execute(
                r#"
                INSERT INTO entry_participants (entry_id, dancer_id, dancer_name, dancer_age)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![p.entry_id, p.dancer_id, p.dancer_name, p.dancer_age],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }

    // ==========================================
    // Queries
    // ==========================================

    pub fn find_by_id(&self, entry_id: &str) -> RepositoryResult<Option<EntryRecord>> {
        let conn = self.get_conn()?;
        let entry = conn
            .query_row(
                &format!("SELECT {} FROM entries WHERE entry_id = ?1", ENTRY_COLUMNS),
                params![entry_id],
                map_entry_row,
            )
            .optional()?;
        Ok(entry)
    }

    pub fn find_by_competition(&self, competition_id: &str) -> RepositoryResult<Vec<EntryRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM entries WHERE competition_id = ?1 ORDER BY entry_id",
            ENTRY_COLUMNS
        ))?;

        let entries = stmt
            .query_map(params![competition_id], map_entry_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }

    /// Roster rows of every entry of a competition.
    pub fn find_participants_by_competition(
        &self,
        competition_id: &str,
    ) -> RepositoryResult<Vec<ParticipantRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT p.entry_id, p.dancer_id, p.dancer_name, p.dancer_age
            FROM entry_participants p
            JOIN entries e ON e.entry_id = p.entry_id
            WHERE e.competition_id = ?1
            ORDER BY p.entry_id, p.dancer_id
            "#,
        )?;

        let rows = stmt
            .query_map(params![competition_id], |row| {
                Ok(ParticipantRecord {
                    entry_id: row.get(0)?,
                    dancer_id: row.get(1)?,
                    dancer_name: row.get(2)?,
                    dancer_age: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}

fn map_entry_row(row: &Row) -> SqliteResult<EntryRecord> {
    Ok(EntryRecord {
        entry_id: row.get(0)?,
        competition_id: row.get(1)?,
        title: row.get(2)?,
        studio_id: row.get(3)?,
        studio_name: row.get(4)?,
        category_id: row.get(5)?,
        category_name: row.get(6)?,
        age_group_id: row.get(7)?,
        age_group_name: row.get(8)?,
        entry_size_category_id: row.get(9)?,
        duration_minutes: row.get(10)?,
        warm_up_minutes: row.get(11)?,
        session_id: row.get(12)?,
        performance_time: row.get(13)?,
        running_order: row.get(14)?,
        entry_number: row.get(15)?,
        entry_suffix: row.get(16)?,
    })
}
