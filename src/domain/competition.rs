// ==========================================
// Competition Scheduler - Competition
// ==========================================
// Only the scheduling-relevant slice of a competition row:
// schedule state and the revision used for optimistic locking.
// ==========================================

use crate::domain::types::ScheduleState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    pub competition_id: String,
    pub name: String,
    pub schedule_state: ScheduleState,
    pub schedule_revision: i64, // bumped on every schedule write
}

impl Competition {
    pub fn schedule_locked(&self) -> bool {
        self.schedule_state.is_locked()
    }
}
