// ==========================================
// Competition Scheduler - Publish API
// ==========================================
// Schedule state machine:
//   DRAFT --finalize--> FINALIZED --publish--> PUBLISHED
//   FINALIZED / PUBLISHED --unlock--> DRAFT
// finalize: numbers every scheduled entry from ENTRY_NUMBER_START
// publish:  gated on a valid, fully numbered schedule
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::snapshot::{ScheduleSnapshot, SnapshotLoader};
use crate::config::ConfigManager;
use crate::domain::action_log::{ScheduleActionLog, ScheduleActionType};
use crate::domain::constraints::ConstraintOverrides;
use crate::domain::entry_number::{EntryNumber, ENTRY_NUMBER_START};
use crate::domain::types::ScheduleState;
use crate::engine::entry_numbering::{assign_entry_numbers, late_entry_number};
use crate::engine::schedule_validator::{publish_blockers, validate_schedule, ScheduleStats};
use crate::repository::{NumberAssignment, ScheduleWrite, ScheduleWriteRepository};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeResponse {
    pub numbered_entries: usize,
    pub first_number: Option<String>,
    pub last_number: Option<String>,
    pub schedule_revision: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResponse {
    pub stats: ScheduleStats,
    pub schedule_revision: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LateNumberResponse {
    pub entry_id: String,
    pub entry_number: EntryNumber,
    pub schedule_revision: i64,
}

pub struct PublishApi {
    loader: Arc<SnapshotLoader>,
    config_manager: Arc<ConfigManager>,
    write_repo: Arc<ScheduleWriteRepository>,
}

impl PublishApi {
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

    /// Lock entry numbers: DRAFT -> FINALIZED.
    ///
    /// Scheduled entries are renumbered in competition order; unscheduled
    /// entries lose any stale number.
    pub fn finalize_schedule(
        &self,
        competition_id: &str,
        actor: &str,
        expected_revision: Option<i64>,
    ) -> ApiResult<FinalizeResponse> {
        let snapshot = self.loader.load(competition_id)?;
        ensure_state(&snapshot, ScheduleState::Draft, ScheduleState::Finalized)?;

        let assigned = assign_entry_numbers(&snapshot.entries, &snapshot.sessions, ENTRY_NUMBER_START);

        let mut numbers: Vec<NumberAssignment> = assigned
            .iter()
            .map(|(entry_id, number)| NumberAssignment {
                entry_id: entry_id.clone(),
                entry_number: Some(*number),
            })
            .collect();
        numbers.extend(
            snapshot
                .entries
                .iter()
                .filter(|e| e.entry_number.is_some() && !assigned.iter().any(|(id, _)| id == &e.id))
                .map(|e| NumberAssignment {
                    entry_id: e.id.clone(),
                    entry_number: None,
                }),
        );

        let first_number = assigned.first().map(|(_, n)| n.to_string());
        let last_number = assigned.last().map(|(_, n)| n.to_string());

        let action = ScheduleActionLog::new(competition_id, ScheduleActionType::Finalize, actor)
            .with_payload(json!({
                "numbered": assigned.len(),
                "first_number": first_number,
                "last_number": last_number,
            }));
        let write = ScheduleWrite::new(action)
            .with_numbers(numbers)
            .with_state(ScheduleState::Finalized);
        let revision = self.write_repo.apply(
            competition_id,
            snapshot.expected_revision(expected_revision),
            &write,
        )?;

        info!(competition_id, numbered = assigned.len(), revision, "schedule finalized");
        Ok(FinalizeResponse {
            numbered_entries: assigned.len(),
            first_number,
            last_number,
            schedule_revision: revision,
        })
    }

    /// FINALIZED -> PUBLISHED, only for a valid and fully numbered schedule.
    pub fn publish_schedule(
        &self,
        competition_id: &str,
        overrides: &ConstraintOverrides,
        actor: &str,
        expected_revision: Option<i64>,
    ) -> ApiResult<PublishResponse> {
        let snapshot = self.loader.load(competition_id)?;
        ensure_state(&snapshot, ScheduleState::Finalized, ScheduleState::Published)?;

        let constraints = self
            .config_manager
            .load_constraints(competition_id, overrides)
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let validation = validate_schedule(&snapshot.entries, &snapshot.sessions, &constraints);
        let stats = ScheduleStats::compute(&snapshot.entries, &snapshot.sessions, &validation.conflicts);

        let blockers = publish_blockers(&validation, &snapshot.entries);
        if !blockers.is_empty() {
            warn!(competition_id, blockers = blockers.len(), "publish rejected");
            return Err(ApiError::PublishRejected {
                reason: format!(
                    "{} blocker(s): {} error conflict(s), {} unnumbered entries",
                    blockers.len(),
                    stats.error_count,
                    blockers.len() - stats.error_count
                ),
                blockers,
            });
        }

        let action = ScheduleActionLog::new(competition_id, ScheduleActionType::Publish, actor)
            .with_payload(json!({ "stats": stats, "constraints": constraints }));
        let write = ScheduleWrite::new(action).with_state(ScheduleState::Published);
        let revision = self.write_repo.apply(
            competition_id,
            snapshot.expected_revision(expected_revision),
            &write,
        )?;

        info!(competition_id, revision, "schedule published");
        Ok(PublishResponse {
            stats,
            schedule_revision: revision,
        })
    }

    /// FINALIZED / PUBLISHED -> DRAFT. Stored numbers are kept until the
    /// next finalize renumbers.
    pub fn unlock_schedule(
        &self,
        competition_id: &str,
        reason: &str,
        actor: &str,
        expected_revision: Option<i64>,
    ) -> ApiResult<i64> {
        if reason.trim().is_empty() {
            return Err(ApiError::InvalidInput("unlock reason must not be empty".to_string()));
        }

        let snapshot = self.loader.load(competition_id)?;
        let from = snapshot.competition.schedule_state;
        if from == ScheduleState::Draft {
            return Err(ApiError::InvalidStateTransition {
                from: from.to_string(),
                to: ScheduleState::Draft.to_string(),
            });
        }

        let action = ScheduleActionLog::new(competition_id, ScheduleActionType::Unlock, actor)
            .with_payload(json!({ "from": from.to_db_str() }))
            .with_detail(reason);
        let write = ScheduleWrite::new(action).with_state(ScheduleState::Draft);
        let revision = self.write_repo.apply(
            competition_id,
            snapshot.expected_revision(expected_revision),
            &write,
        )?;

        info!(competition_id, from = %from, revision, "schedule unlocked");
        Ok(revision)
    }

    /// Number an entry scheduled after finalize (e.g. 156a).
    pub fn assign_late_entry_number(
        &self,
        competition_id: &str,
        entry_id: &str,
        actor: &str,
        expected_revision: Option<i64>,
    ) -> ApiResult<LateNumberResponse> {
        let snapshot = self.loader.load(competition_id)?;
        snapshot.ensure_unlocked()?;

        if !snapshot.competition.schedule_state.numbers_locked() {
            return Err(ApiError::InvalidInput(
                "entry numbers are assigned at finalize while the schedule is a draft".to_string(),
            ));
        }

        let entry = snapshot.require_entry(entry_id)?;
        if let Some(existing) = entry.entry_number {
            return Err(ApiError::InvalidInput(format!(
                "entry {} already has number {}",
                entry_id, existing
            )));
        }
        if !entry.is_scheduled() {
            return Err(ApiError::InvalidInput(format!(
                "entry {} is not scheduled",
                entry_id
            )));
        }

        let number = late_entry_number(entry_id, &snapshot.entries, &snapshot.sessions).ok_or_else(|| {
            ApiError::InvalidInput(format!("no free late suffix for entry {}", entry_id))
        })?;

        let action = ScheduleActionLog::new(competition_id, ScheduleActionType::LateNumber, actor)
            .with_payload(json!({ "entry_id": entry_id, "entry_number": number.to_string() }));
        let write = ScheduleWrite::new(action).with_numbers(vec![NumberAssignment {
            entry_id: entry_id.to_string(),
            entry_number: Some(number),
        }]);
        let revision = self.write_repo.apply(
            competition_id,
            snapshot.expected_revision(expected_revision),
            &write,
        )?;

        info!(competition_id, entry_id, entry_number = %number, "late entry numbered");
        Ok(LateNumberResponse {
            entry_id: entry_id.to_string(),
            entry_number: number,
            schedule_revision: revision,
        })
    }
}

fn ensure_state(snapshot: &ScheduleSnapshot, required: ScheduleState, target: ScheduleState) -> ApiResult<()> {
    let current = snapshot.competition.schedule_state;
    if current != required {
        return Err(ApiError::InvalidStateTransition {
            from: current.to_string(),
            to: target.to_string(),
        });
    }
    Ok(())
}
