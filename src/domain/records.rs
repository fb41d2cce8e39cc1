// ==========================================
// Competition Scheduler - Persisted Record Shapes
// ==========================================
// Rows as they come out of storage: loosely typed, nullable.
// The adapter (engine::adapter) validates them into value types.
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryRecord {
    pub entry_id: String,
    pub competition_id: String,
    pub title: String,
    pub studio_id: String,
    pub studio_name: String,
    pub category_id: String,
    pub category_name: String,
    pub age_group_id: String,
    pub age_group_name: String,
    pub entry_size_category_id: String,
    pub duration_minutes: Option<i64>,
    pub warm_up_minutes: Option<i64>,
    pub session_id: Option<String>,
    pub performance_time: Option<NaiveDateTime>,
    pub running_order: Option<i64>,
    pub entry_number: Option<i64>,
    pub entry_suffix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub entry_id: String,
    pub dancer_id: String,
    pub dancer_name: String,
    pub dancer_age: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub competition_id: String,
    pub session_number: i64,
    pub session_name: Option<String>,
    pub session_date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub max_entries: Option<i64>,
}
