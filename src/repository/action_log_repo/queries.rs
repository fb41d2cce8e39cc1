use super::core::{ActionLogRepository, TS_FORMAT};
use crate::domain::action_log::{ScheduleActionLog, ScheduleActionType};
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row};

impl ActionLogRepository {
    pub fn find_by_id(&self, action_id: &str) -> RepositoryResult<Option<ScheduleActionLog>> {
        let conn = self.get_conn()?;
        let log = conn
            .query_row(
                r#"
                SELECT action_id, competition_id, action_type, action_ts, actor,
                       session_id, payload_json, detail
                FROM schedule_action_log
                WHERE action_id = ?1
                "#,
                params![action_id],
                map_row,
            )
            .optional()?;
        Ok(log)
    }

    /// Audit trail of a competition, newest first.
    pub fn find_by_competition(
        &self,
        competition_id: &str,
        limit: i64,
    ) -> RepositoryResult<Vec<ScheduleActionLog>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, competition_id, action_type, action_ts, actor,
                   session_id, payload_json, detail
            FROM schedule_action_log
            WHERE competition_id = ?1
            ORDER BY action_ts DESC, rowid DESC
            LIMIT ?2
            "#,
        )?;

        let logs = stmt
            .query_map(params![competition_id, limit], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(logs)
    }
}

fn map_row(row: &Row) -> SqliteResult<ScheduleActionLog> {
    let action_type_str: String = row.get(2)?;
    let action_ts_str: String = row.get(3)?;
    let payload_json_str: Option<String> = row.get(6)?;

    let action_type = ScheduleActionType::from_db_str(&action_type_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown action type: {}", action_type_str).into(),
        )
    })?;

    let action_ts = NaiveDateTime::parse_from_str(&action_ts_str, TS_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(ScheduleActionLog {
        action_id: row.get(0)?,
        competition_id: row.get(1)?,
        action_type,
        action_ts,
        actor: row.get(4)?,
        session_id: row.get(5)?,
        payload_json: payload_json_str.and_then(|s| serde_json::from_str(&s).ok()),
        detail: row.get(7)?,
    })
}
