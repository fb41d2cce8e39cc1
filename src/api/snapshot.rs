// ==========================================
// Competition Scheduler - Schedule snapshot loading
// ==========================================
// Storage rows -> engine value types for one competition.
// The competition row is read first: its revision is the one every
// write computed from this snapshot must still match.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::competition::Competition;
use crate::domain::entry::SchedulingEntry;
use crate::domain::session::SessionCapacity;
use crate::engine::adapter::{to_scheduling_entries, to_session_capacity};
use crate::repository::{CompetitionRepository, EntryRepository, SessionRepository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    pub competition: Competition,
    pub sessions: Vec<SessionCapacity>,
    pub entries: Vec<SchedulingEntry>,
}

impl ScheduleSnapshot {
    pub fn session(&self, session_id: &str) -> Option<&SessionCapacity> {
        self.sessions.iter().find(|s| s.session_id == session_id)
    }

    pub fn entry(&self, entry_id: &str) -> Option<&SchedulingEntry> {
        self.entries.iter().find(|e| e.id == entry_id)
    }

    pub fn require_session(&self, session_id: &str) -> ApiResult<&SessionCapacity> {
        self.session(session_id)
            .ok_or_else(|| ApiError::NotFound(format!("Session(id={})", session_id)))
    }

    pub fn require_entry(&self, entry_id: &str) -> ApiResult<&SchedulingEntry> {
        self.entry(entry_id)
            .ok_or_else(|| ApiError::NotFound(format!("Entry(id={})", entry_id)))
    }

    /// Reject scheduling mutations on a published schedule.
    pub fn ensure_unlocked(&self) -> ApiResult<()> {
        if self.competition.schedule_locked() {
            tracing::warn!(
                competition_id = %self.competition.competition_id,
                "scheduling mutation rejected: schedule is locked"
            );
            return Err(ApiError::ScheduleLocked {
                competition_id: self.competition.competition_id.clone(),
            });
        }
        Ok(())
    }

    /// Revision a write must match: the caller's if given, else the snapshot's.
    pub fn expected_revision(&self, caller_revision: Option<i64>) -> i64 {
        caller_revision.unwrap_or(self.competition.schedule_revision)
    }

    /// Replace entries by id with their updated copies.
    pub fn apply_entries(&mut self, updated: &[SchedulingEntry]) {
        for entry in self.entries.iter_mut() {
            if let Some(u) = updated.iter().find(|u| u.id == entry.id) {
                *entry = u.clone();
            }
        }
    }
}

pub struct SnapshotLoader {
    competition_repo: Arc<CompetitionRepository>,
    session_repo: Arc<SessionRepository>,
    entry_repo: Arc<EntryRepository>,
}

impl SnapshotLoader {
    pub fn new(
        competition_repo: Arc<CompetitionRepository>,
        session_repo: Arc<SessionRepository>,
        entry_repo: Arc<EntryRepository>,
    ) -> Self {
        Self {
            competition_repo,
            session_repo,
            entry_repo,
        }
    }

    pub fn load(&self, competition_id: &str) -> ApiResult<ScheduleSnapshot> {
        if competition_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("competition_id must not be empty".to_string()));
        }

        let competition = self.competition_repo.get(competition_id)?;

        let counts = self.session_repo.assigned_counts(competition_id)?;
        let sessions = self
            .session_repo
            .find_by_competition(competition_id)?
            .into_iter()
            .map(|record| {
                let assigned = counts.get(&record.session_id).copied().unwrap_or(0);
                to_session_capacity(record, assigned)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let participants = self.entry_repo.find_participants_by_competition(competition_id)?;
        let entries = to_scheduling_entries(
            self.entry_repo.find_by_competition(competition_id)?,
            &participants,
        )?;

        tracing::debug!(
            competition_id,
            revision = competition.schedule_revision,
            sessions = sessions.len(),
            entries = entries.len(),
            "schedule snapshot loaded"
        );

        Ok(ScheduleSnapshot {
            competition,
            sessions,
            entries,
        })
    }
}
