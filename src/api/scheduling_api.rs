// ==========================================
// Competition Scheduler - Scheduling API
// ==========================================
// Queries, auto-scheduling, manual assignment, clearing, validation.
// Every mutation:
// 1) loads a fresh snapshot and checks the schedule lock first
// 2) runs the engine on value types
// 3) persists in one revision-guarded transaction with an audit row
// ==========================================

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::snapshot::{ScheduleSnapshot, SnapshotLoader};
use crate::config::ConfigManager;
use crate::domain::action_log::{ScheduleActionLog, ScheduleActionType};
use crate::domain::conflict::Conflict;
use crate::domain::constraints::{ConstraintOverrides, SchedulingConstraints};
use crate::domain::entry::SchedulingEntry;
use crate::engine::auto_scheduler::{auto_schedule_session, AutoScheduleResult};
use crate::engine::capacity::{session_stats, SessionStats};
use crate::engine::conflict_detector::get_all_conflicts;
use crate::engine::entry_numbering::late_entry_number;
use crate::engine::schedule_validator::{validate_schedule, ScheduleStats, ScheduleValidation};
use crate::repository::{NumberAssignment, ScheduleWrite, ScheduleWriteRepository, SlotAssignment};

// ==========================================
// Request / response types
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoScheduleResponse {
    pub result: AutoScheduleResult,
    /// Late numbers handed out when the schedule was already finalized
    pub late_numbers: Vec<(String, String)>,
    pub schedule_revision: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualAssignRequest {
    pub entry_id: String,
    pub session_id: String,
    pub performance_time: NaiveDateTime,
    pub running_order: u32,
    #[serde(default)]
    pub expected_revision: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualAssignResponse {
    pub entry: SchedulingEntry,
    /// Conflicts involving the moved entry after the move
    pub conflicts: Vec<Conflict>,
    pub schedule_revision: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub cleared_entry_ids: Vec<String>,
    pub schedule_revision: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub competition_id: String,
    pub schedule_state: String,
    pub validation: ScheduleValidation,
    pub stats: ScheduleStats,
}

// ==========================================
// SchedulingApi
// ==========================================
pub struct SchedulingApi {
    loader: Arc<SnapshotLoader>,
    config_manager: Arc<ConfigManager>,
    write_repo: Arc<ScheduleWriteRepository>,
}

impl SchedulingApi {
    pub fn new(
        loader: Arc<SnapshotLoader>,
        config_manager: Arc<ConfigManager>,
        write_repo: Arc<ScheduleWriteRepository>,
    ) -> Self {
        Self {
            loader,
            config_manager,
            write_repo,
        }
    }

    fn constraints(&self, competition_id: &str, overrides: &ConstraintOverrides) -> ApiResult<SchedulingConstraints> {
        self.config_manager
            .load_constraints(competition_id, overrides)
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }

    // ==========================================
    // Queries
    // ==========================================

    pub fn get_schedule(&self, competition_id: &str) -> ApiResult<ScheduleSnapshot> {
        self.loader.load(competition_id)
    }

    pub fn get_unscheduled_entries(&self, competition_id: &str) -> ApiResult<Vec<SchedulingEntry>> {
        let snapshot = self.loader.load(competition_id)?;
        Ok(snapshot
            .entries
            .into_iter()
            .filter(|e| !e.is_scheduled())
            .collect())
    }

    pub fn get_session_stats(
        &self,
        competition_id: &str,
        session_id: &str,
        overrides: &ConstraintOverrides,
    ) -> ApiResult<SessionStats> {
        let snapshot = self.loader.load(competition_id)?;
        let constraints = self.constraints(competition_id, overrides)?;
        let session = snapshot.require_session(session_id)?;
        Ok(session_stats(session, &snapshot.entries, &constraints))
    }

    pub fn get_conflicts(&self, competition_id: &str, overrides: &ConstraintOverrides) -> ApiResult<Vec<Conflict>> {
        let snapshot = self.loader.load(competition_id)?;
        let constraints = self.constraints(competition_id, overrides)?;
        Ok(get_all_conflicts(&snapshot.entries, &snapshot.sessions, &constraints))
    }

    pub fn validate_schedule(
        &self,
        competition_id: &str,
        overrides: &ConstraintOverrides,
    ) -> ApiResult<ValidationReport> {
        let snapshot = self.loader.load(competition_id)?;
        let constraints = self.constraints(competition_id, overrides)?;

        let validation = validate_schedule(&snapshot.entries, &snapshot.sessions, &constraints);
        let stats = ScheduleStats::compute(&snapshot.entries, &snapshot.sessions, &validation.conflicts);

        Ok(ValidationReport {
            competition_id: snapshot.competition.competition_id.clone(),
            schedule_state: snapshot.competition.schedule_state.to_string(),
            validation,
            stats,
        })
    }

    // ==========================================
    // Mutations
    // ==========================================

    /// Auto-place `entry_ids` (in the given order) into a session.
    pub fn auto_schedule(
        &self,
        competition_id: &str,
        session_id: &str,
        entry_ids: &[String],
        overrides: &ConstraintOverrides,
        actor: &str,
    ) -> ApiResult<AutoScheduleResponse> {
        let mut snapshot = self.loader.load(competition_id)?;
        snapshot.ensure_unlocked()?;

        if entry_ids.is_empty() {
            return Err(ApiError::InvalidInput("entry_ids must not be empty".to_string()));
        }
        let session = snapshot.require_session(session_id)?.clone();
        let candidates = entry_ids
            .iter()
            .map(|id| snapshot.require_entry(id).cloned())
            .collect::<ApiResult<Vec<_>>>()?;
        let constraints = self.constraints(competition_id, overrides)?;

        let result = auto_schedule_session(&session, &snapshot.entries, &candidates, &constraints);

        if result.scheduled.is_empty() {
            info!(competition_id, session_id, skipped = result.skipped_count(), "nothing placed");
            return Ok(AutoScheduleResponse {
                result,
                late_numbers: Vec::new(),
                schedule_revision: snapshot.competition.schedule_revision,
            });
        }

        snapshot.apply_entries(&result.scheduled);
        let numbers = if snapshot.competition.schedule_state.numbers_locked() {
            late_numbers_for(&mut snapshot, &result.scheduled)
        } else {
            Vec::new()
        };

        let action = ScheduleActionLog::new(competition_id, ScheduleActionType::AutoSchedule, actor)
            .with_session(session_id)
            .with_payload(json!({
                "scheduled": result.scheduled.iter().map(|e| &e.id).collect::<Vec<_>>(),
                "skipped": &result.skipped,
                "constraints": constraints,
            }))
            .with_detail(format!(
                "{} placed, {} skipped",
                result.scheduled_count(),
                result.skipped_count()
            ));

        let write = ScheduleWrite::new(action)
            .with_slots(result.scheduled.iter().map(slot_of).collect())
            .with_numbers(numbers.clone());
        let revision = self.write_repo.apply(
            competition_id,
            snapshot.competition.schedule_revision,
            &write,
        )?;

        Ok(AutoScheduleResponse {
            result,
            late_numbers: numbers
                .into_iter()
                .filter_map(|n| n.entry_number.map(|num| (n.entry_id, num.to_string())))
                .collect(),
            schedule_revision: revision,
        })
    }

    /// Place one entry at an explicit slot. Conflicts are reported, not rejected.
    pub fn assign_entry(
        &self,
        competition_id: &str,
        request: &ManualAssignRequest,
        actor: &str,
    ) -> ApiResult<ManualAssignResponse> {
        let mut snapshot = self.loader.load(competition_id)?;
        snapshot.ensure_unlocked()?;

        if request.running_order == 0 {
            return Err(ApiError::InvalidInput("running_order must be positive".to_string()));
        }
        snapshot.require_session(&request.session_id)?;
        let placed = snapshot.require_entry(&request.entry_id)?.placed(
            &request.session_id,
            request.performance_time,
            request.running_order,
        );

        snapshot.apply_entries(std::slice::from_ref(&placed));
        let numbers = if snapshot.competition.schedule_state.numbers_locked() {
            late_numbers_for(&mut snapshot, std::slice::from_ref(&placed))
        } else {
            Vec::new()
        };

        let constraints = self.constraints(competition_id, &ConstraintOverrides::default())?;
        let conflicts: Vec<Conflict> = get_all_conflicts(&snapshot.entries, &snapshot.sessions, &constraints)
            .into_iter()
            .filter(|c| c.involves(&placed.id))
            .collect();
        if !conflicts.is_empty() {
            warn!(
                competition_id,
                entry_id = %placed.id,
                conflicts = conflicts.len(),
                "manual assignment introduces conflicts"
            );
        }

        let action = ScheduleActionLog::new(competition_id, ScheduleActionType::ManualAssign, actor)
            .with_session(&request.session_id)
            .with_payload(json!({
                "entry_id": placed.id,
                "performance_time": request.performance_time,
                "running_order": request.running_order,
                "conflicts": conflicts.len(),
            }));
        let write = ScheduleWrite::new(action)
            .with_slots(vec![slot_of(&placed)])
            .with_numbers(numbers);
        let revision = self.write_repo.apply(
            competition_id,
            snapshot.expected_revision(request.expected_revision),
            &write,
        )?;

        let entry = snapshot.require_entry(&placed.id)?.clone();
        Ok(ManualAssignResponse {
            entry,
            conflicts,
            schedule_revision: revision,
        })
    }

    /// Unschedule every entry of a session.
    pub fn clear_session(
        &self,
        competition_id: &str,
        session_id: &str,
        actor: &str,
        expected_revision: Option<i64>,
    ) -> ApiResult<ClearResponse> {
        let snapshot = self.loader.load(competition_id)?;
        snapshot.ensure_unlocked()?;
        snapshot.require_session(session_id)?;

        let ids: Vec<String> = snapshot
            .entries
            .iter()
            .filter(|e| e.is_in_session(session_id))
            .map(|e| e.id.clone())
            .collect();
        self.clear_entries(&snapshot, ids, Some(session_id), actor, expected_revision)
    }

    /// Unschedule individual entries.
    pub fn unschedule_entries(
        &self,
        competition_id: &str,
        entry_ids: &[String],
        actor: &str,
        expected_revision: Option<i64>,
    ) -> ApiResult<ClearResponse> {
        let snapshot = self.loader.load(competition_id)?;
        snapshot.ensure_unlocked()?;

        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for id in entry_ids {
            let entry = snapshot.require_entry(id)?;
            if entry.is_scheduled() && seen.insert(id.as_str()) {
                ids.push(id.clone());
            }
        }
        self.clear_entries(&snapshot, ids, None, actor, expected_revision)
    }

    fn clear_entries(
        &self,
        snapshot: &ScheduleSnapshot,
        entry_ids: Vec<String>,
        session_id: Option<&str>,
        actor: &str,
        expected_revision: Option<i64>,
    ) -> ApiResult<ClearResponse> {
        let competition_id = snapshot.competition.competition_id.as_str();
        if entry_ids.is_empty() {
            return Ok(ClearResponse {
                cleared_entry_ids: entry_ids,
                schedule_revision: snapshot.competition.schedule_revision,
            });
        }

        let mut action = ScheduleActionLog::new(competition_id, ScheduleActionType::ClearSchedule, actor)
            .with_payload(json!({ "entry_ids": &entry_ids }));
        if let Some(session_id) = session_id {
            action = action.with_session(session_id);
        }

        let write = ScheduleWrite::new(action).with_slots(
            entry_ids
                .iter()
                .map(|id| SlotAssignment::cleared(id))
                .collect(),
        );
        let revision = self.write_repo.apply(
            competition_id,
            snapshot.expected_revision(expected_revision),
            &write,
        )?;

        info!(competition_id, cleared = entry_ids.len(), revision, "entries unscheduled");
        Ok(ClearResponse {
            cleared_entry_ids: entry_ids,
            schedule_revision: revision,
        })
    }
}

fn slot_of(entry: &SchedulingEntry) -> SlotAssignment {
    SlotAssignment {
        entry_id: entry.id.clone(),
        session_id: entry.session_id.clone(),
        performance_time: entry.performance_time,
        running_order: entry.running_order,
    }
}

/// Late numbers for newly placed, unnumbered entries, in placement order.
/// The snapshot is updated as numbers are handed out so successive
/// entries behind the same predecessor get successive suffixes.
fn late_numbers_for(snapshot: &mut ScheduleSnapshot, placed: &[SchedulingEntry]) -> Vec<NumberAssignment> {
    let mut numbers = Vec::new();
    for entry in placed {
        let already_numbered = snapshot
            .entry(&entry.id)
            .map(|e| e.entry_number.is_some())
            .unwrap_or(false);
        if already_numbered {
            continue;
        }

        match late_entry_number(&entry.id, &snapshot.entries, &snapshot.sessions) {
            Some(number) => {
                if let Some(e) = snapshot.entries.iter_mut().find(|e| e.id == entry.id) {
                    e.entry_number = Some(number);
                }
                numbers.push(NumberAssignment {
                    entry_id: entry.id.clone(),
                    entry_number: Some(number),
                });
            }
            None => warn!(entry_id = %entry.id, "no late entry suffix left, entry stays unnumbered"),
        }
    }
    numbers
}
