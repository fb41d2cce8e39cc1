// ==========================================
// Competition Scheduler - Schedule Action Log
// ==========================================
// Every schedule write leaves one audit row.
// Aligned with the schedule_action_log table.
// ==========================================

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleActionLog {
    pub action_id: String,
    pub competition_id: String,
    pub action_type: ScheduleActionType,
    pub action_ts: NaiveDateTime,
    pub actor: String,
    pub session_id: Option<String>,
    pub payload_json: Option<JsonValue>,
    pub detail: Option<String>,
}

impl ScheduleActionLog {
    pub fn new(competition_id: &str, action_type: ScheduleActionType, actor: &str) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            competition_id: competition_id.to_string(),
            action_type,
            action_ts: Utc::now().naive_utc(),
            actor: actor.to_string(),
            session_id: None,
            payload_json: None,
            detail: None,
        }
    }

    pub fn with_session(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }

    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload_json = Some(payload);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ==========================================
// ScheduleActionType
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleActionType {
    AutoSchedule,
    ManualAssign,
    ClearSchedule,
    Finalize,
    Publish,
    Unlock,
    LateNumber,
}

impl ScheduleActionType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ScheduleActionType::AutoSchedule => "AUTO_SCHEDULE",
            ScheduleActionType::ManualAssign => "MANUAL_ASSIGN",
            ScheduleActionType::ClearSchedule => "CLEAR_SCHEDULE",
            ScheduleActionType::Finalize => "FINALIZE",
            ScheduleActionType::Publish => "PUBLISH",
            ScheduleActionType::Unlock => "UNLOCK",
            ScheduleActionType::LateNumber => "LATE_NUMBER",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "AUTO_SCHEDULE" => Some(ScheduleActionType::AutoSchedule),
            "MANUAL_ASSIGN" => Some(ScheduleActionType::ManualAssign),
            "CLEAR_SCHEDULE" => Some(ScheduleActionType::ClearSchedule),
            "FINALIZE" => Some(ScheduleActionType::Finalize),
            "PUBLISH" => Some(ScheduleActionType::Publish),
            "UNLOCK" => Some(ScheduleActionType::Unlock),
            "LATE_NUMBER" => Some(ScheduleActionType::LateNumber),
            _ => None,
        }
    }
}

impl fmt::Display for ScheduleActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}
