use crate::domain::action_log::ScheduleActionLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub(super) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// ActionLogRepository
// ==========================================
pub struct ActionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActionLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert one audit row outside any schedule write.
    pub fn insert(&self, log: &ScheduleActionLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        insert_action_log(&conn, log)?;
        Ok(log.action_id.clone())
    }
}

/// Insert on the caller's connection (joins an open transaction).
pub(crate) fn insert_action_log(conn: &Connection, log: &ScheduleActionLog) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO schedule_action_log (
            action_id, competition_id, action_type, action_ts, actor,
            session_id, payload_json, detail
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            log.action_id,
            log.competition_id,
            log.action_type.to_db_str(),
            log.action_ts.format(TS_FORMAT).to_string(),
            log.actor,
            log.session_id,
            log.payload_json.as_ref().map(|v| v.to_string()),
            log.detail,
        ],
    )?;
    Ok(())
}
