// ==========================================
// Competition Scheduler - Session Capacity
// ==========================================
// A time-bounded block (e.g. "Saturday AM") entries perform in.
// current_entry_count and available_minutes are derived values;
// see engine::capacity::compute_capacity.
// ==========================================

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Window length used when a session has no end time
pub const DEFAULT_SESSION_MINUTES: u32 = 240;

// ==========================================
// SessionWindow - raw time window input
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub session_id: String,
    pub session_name: String,
    pub session_date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
}

// ==========================================
// SessionCapacity
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCapacity {
    // ===== Identity =====
    pub session_id: String,
    pub session_name: String,
    pub session_date: NaiveDate,

    // ===== Window =====
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,

    // ===== Limits =====
    pub max_entries: Option<u32>,

    // ===== Derived =====
    pub current_entry_count: u32,
    pub available_minutes: u32,
}

impl SessionCapacity {
    /// Last usable instant of the session: the explicit end time, or
    /// start + available minutes when the end is open.
    pub fn window_end(&self) -> NaiveDateTime {
        self.start_time + Duration::minutes(i64::from(self.available_minutes))
    }
}
