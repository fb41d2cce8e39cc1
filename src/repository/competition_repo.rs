// ==========================================
// Competition Scheduler - Competition repository
// ==========================================
// competitions table: schedule state + schedule revision.
// The revision guards every schedule write (optimistic locking).
// ==========================================

use crate::domain::competition::Competition;
use crate::domain::types::ScheduleState;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

pub struct CompetitionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CompetitionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, competition: &Competition) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO competitions (competition_id, name, schedule_state, schedule_revision)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                competition.competition_id,
                competition.name,
                competition.schedule_state.to_db_str(),
                competition.schedule_revision,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, competition_id: &str) -> RepositoryResult<Option<Competition>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                r#"
                SELECT competition_id, name, schedule_state, schedule_revision
                FROM competitions
                WHERE competition_id = ?1
                "#,
                params![competition_id],
                map_row,
            )
            .optional()?;

        raw.map(RawCompetition::into_competition).transpose()
    }

    /// Like `find_by_id`, but a missing row is `NotFound`.
    pub fn get(&self, competition_id: &str) -> RepositoryResult<Competition> {
        self.find_by_id(competition_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Competition".to_string(),
                id: competition_id.to_string(),
            })
    }
}

/// Bump `schedule_revision` iff it still equals `expected`, optionally
/// moving the schedule state in the same statement.
///
/// Runs on the caller's connection so it joins the caller's transaction.
///
/// # Errors
/// - `RepositoryError::OptimisticLockFailure`: someone else wrote first
/// - `RepositoryError::NotFound`: no such competition
pub(crate) fn bump_schedule_revision(
    conn: &Connection,
    competition_id: &str,
    expected: i64,
    new_state: Option<ScheduleState>,
) -> RepositoryResult<i64> {
    let rows_affected = conn.execute(
        r#"
        UPDATE competitions
        SET schedule_revision = schedule_revision + 1,
            schedule_state = COALESCE(?1, schedule_state),
            updated_at = datetime('now')
        WHERE competition_id = ?2 AND schedule_revision = ?3
        "#,
        params![new_state.map(|s| s.to_db_str()), competition_id, expected],
    )?;

    if rows_affected == 0 {
        let actual: Option<i64> = conn
            .query_row(
                "SELECT schedule_revision FROM competitions WHERE competition_id = ?1",
                params![competition_id],
                |row| row.get(0),
            )
            .optional()?;

        return Err(match actual {
            Some(actual) => RepositoryError::OptimisticLockFailure {
                competition_id: competition_id.to_string(),
                expected,
                actual,
            },
            None => RepositoryError::NotFound {
                entity: "Competition".to_string(),
                id: competition_id.to_string(),
            },
        });
    }

    Ok(expected + 1)
}

struct RawCompetition {
    competition_id: String,
    name: String,
    schedule_state: String,
    schedule_revision: i64,
}

impl RawCompetition {
    fn into_competition(self) -> RepositoryResult<Competition> {
        let schedule_state = ScheduleState::from_db_str(&self.schedule_state).ok_or_else(|| {
            RepositoryError::FieldValueError {
                field: "schedule_state".to_string(),
                message: format!(
                    "unknown schedule state '{}' on competition {}",
                    self.schedule_state, self.competition_id
                ),
            }
        })?;

        Ok(Competition {
            competition_id: self.competition_id,
            name: self.name,
            schedule_state,
            schedule_revision: self.schedule_revision,
        })
    }
}

fn map_row(row: &Row) -> rusqlite::Result<RawCompetition> {
    Ok(RawCompetition {
        competition_id: row.get(0)?,
        name: row.get(1)?,
        schedule_state: row.get(2)?,
        schedule_revision: row.get(3)?,
    })
}
