// ==========================================
// Competition Scheduler - Scheduling Entry
// ==========================================
// One performable routine as seen by the engine.
// Built by the adapter from persisted records; never carries
// untyped or partially-validated fields.
// ==========================================

use crate::domain::entry_number::EntryNumber;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Participant - dancer on the entry roster
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub dancer_id: String,
    pub dancer_name: String,
    pub dancer_age: Option<u32>,
}

// ==========================================
// SchedulingEntry
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingEntry {
    // ===== Identity =====
    pub id: String,
    pub title: String,

    // ===== Grouping keys =====
    pub studio_id: String,
    pub studio_name: String,
    pub category_id: String,
    pub category_name: String,
    pub age_group_id: String,
    pub age_group_name: String,
    pub entry_size_category_id: String,

    // ===== Timing (minutes) =====
    pub duration: u32,     // performance length
    pub warm_up_time: u32, // required immediately before performing

    // ===== Assignment =====
    pub session_id: Option<String>,           // None = unscheduled
    pub performance_time: Option<NaiveDateTime>,
    pub running_order: Option<u32>,           // unique per session
    pub entry_number: Option<EntryNumber>,

    // ===== Roster =====
    pub participants: Vec<Participant>,
}

impl SchedulingEntry {
    pub fn is_scheduled(&self) -> bool {
        self.session_id.is_some()
    }

    pub fn is_in_session(&self, session_id: &str) -> bool {
        self.session_id.as_deref() == Some(session_id)
    }

    /// End of the on-stage performance, if the entry has a start time.
    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.performance_time
            .map(|start| start + Duration::minutes(i64::from(self.duration)))
    }

    /// Dancers appearing in both entries, ordered by dancer id.
    pub fn shared_dancers<'a>(&'a self, other: &SchedulingEntry) -> Vec<&'a Participant> {
        let mut shared: Vec<&Participant> = self
            .participants
            .iter()
            .filter(|p| other.participants.iter().any(|o| o.dancer_id == p.dancer_id))
            .collect();
        shared.sort_by(|a, b| a.dancer_id.cmp(&b.dancer_id));
        shared.dedup_by(|a, b| a.dancer_id == b.dancer_id);
        shared
    }

    /// Copy of this entry placed into a session slot.
    pub fn placed(
        &self,
        session_id: &str,
        performance_time: NaiveDateTime,
        running_order: u32,
    ) -> SchedulingEntry {
        SchedulingEntry {
            session_id: Some(session_id.to_string()),
            performance_time: Some(performance_time),
            running_order: Some(running_order),
            ..self.clone()
        }
    }
}
