// ==========================================
// Competition Scheduler - Schedule write repository
// ==========================================
// One transaction per schedule write:
// 1) revision check + bump on competitions (optimistic lock)
// 2) slot / number updates on entries
// 3) audit row in schedule_action_log
// Any failure rolls the whole write back.
// ==========================================

use crate::domain::action_log::ScheduleActionLog;
use crate::domain::entry_number::EntryNumber;
use crate::domain::types::ScheduleState;
use crate::repository::action_log_repo::insert_action_log;
use crate::repository::competition_repo::bump_schedule_revision;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::instrument;

/// New placement of one entry; all `None` clears the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAssignment {
    pub entry_id: String,
    pub session_id: Option<String>,
    pub performance_time: Option<NaiveDateTime>,
    pub running_order: Option<u32>,
}

impl SlotAssignment {
    pub fn cleared(entry_id: &str) -> Self {
        Self {
            entry_id: entry_id.to_string(),
            session_id: None,
            performance_time: None,
            running_order: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberAssignment {
    pub entry_id: String,
    pub entry_number: Option<EntryNumber>,
}

#[derive(Debug, Clone)]
pub struct ScheduleWrite {
    pub slots: Vec<SlotAssignment>,
    pub numbers: Vec<NumberAssignment>,
    pub new_state: Option<ScheduleState>,
    pub action: ScheduleActionLog,
}

impl ScheduleWrite {
    pub fn new(action: ScheduleActionLog) -> Self {
        Self {
            slots: Vec::new(),
            numbers: Vec::new(),
            new_state: None,
            action,
        }
    }

    pub fn with_slots(mut self, slots: Vec<SlotAssignment>) -> Self {
        self.slots = slots;
        self
    }

    pub fn with_numbers(mut self, numbers: Vec<NumberAssignment>) -> Self {
        self.numbers = numbers;
        self
    }

    pub fn with_state(mut self, state: ScheduleState) -> Self {
        self.new_state = Some(state);
        self
    }
}

pub struct ScheduleWriteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleWriteRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Apply a schedule write if the competition is still at `expected_revision`.
    ///
    /// # Returns
    /// The new schedule revision.
    ///
    /// # Errors
    /// - `OptimisticLockFailure`: the snapshot the write was computed from is stale
    /// - `NotFound`: unknown competition, or an entry outside the competition
    #[instrument(skip(self, write), fields(
        slots = write.slots.len(),
        numbers = write.numbers.len(),
        action = %write.action.action_type
    ))]
    pub fn apply(
        &self,
        competition_id: &str,
        expected_revision: i64,
        write: &ScheduleWrite,
    ) -> RepositoryResult<i64> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let revision = bump_schedule_revision(&tx, competition_id, expected_revision, write.new_state)?;

        for slot in &write.slots {
            let rows = tx.execute(
                r#"
                UPDATE entries
                SET session_id = ?1, performance_time = ?2, running_order = ?3
                WHERE entry_id = ?4 AND competition_id = ?5
                "#,
                params![
                    slot.session_id,
                    slot.performance_time,
                    slot.running_order,
                    slot.entry_id,
                    competition_id,
                ],
            )?;
            ensure_entry_updated(rows, &slot.entry_id)?;
        }

        for number in &write.numbers {
            let rows = tx.execute(
                r#"
                UPDATE entries
                SET entry_number = ?1, entry_suffix = ?2
                WHERE entry_id = ?3 AND competition_id = ?4
                "#,
                params![
                    number.entry_number.map(|n| n.number),
                    number
                        .entry_number
                        .and_then(|n| n.suffix)
                        .map(|c| c.to_string()),
                    number.entry_id,
                    competition_id,
                ],
            )?;
            ensure_entry_updated(rows, &number.entry_id)?;
        }

        insert_action_log(&tx, &write.action)?;
        tx.commit()?;

        tracing::info!(competition_id, revision, "schedule write committed");
        Ok(revision)
    }
}

fn ensure_entry_updated(rows: usize, entry_id: &str) -> RepositoryResult<()> {
    if rows == 0 {
        return Err(RepositoryError::NotFound {
            entity: "Entry".to_string(),
            id: entry_id.to_string(),
        });
    }
    Ok(())
}
