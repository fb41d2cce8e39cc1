// ==========================================
// Competition Scheduler - Schedule Validator
// ==========================================
// Whole-competition validation on top of the conflict detector,
// plus the summary statistics and the publish gate inputs.
// Validating the same snapshot twice yields the same result.
// ==========================================

use crate::domain::conflict::Conflict;
use crate::domain::constraints::SchedulingConstraints;
use crate::domain::entry::SchedulingEntry;
use crate::domain::session::SessionCapacity;
use crate::domain::types::Severity;
use crate::engine::conflict_detector::get_all_conflicts;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleValidation {
    pub conflicts: Vec<Conflict>,
    /// true iff no conflict has severity Error
    pub is_valid: bool,
}

impl ScheduleValidation {
    pub fn errors(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(|c| c.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(|c| c.severity == Severity::Warning)
    }
}

#[instrument(skip_all, fields(
    entries_count = entries.len(),
    sessions_count = sessions.len()
))]
pub fn validate_schedule(
    entries: &[SchedulingEntry],
    sessions: &[SessionCapacity],
    constraints: &SchedulingConstraints,
) -> ScheduleValidation {
    let conflicts = get_all_conflicts(entries, sessions, constraints);
    let is_valid = !conflicts.iter().any(Conflict::is_error);

    tracing::info!(
        conflicts_count = conflicts.len(),
        is_valid,
        "schedule validated"
    );
    ScheduleValidation { conflicts, is_valid }
}

// ==========================================
// ScheduleStats
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleStats {
    pub total_entries: usize,
    pub scheduled_entries: usize,
    pub unscheduled_entries: usize,
    pub total_sessions: usize,
    pub error_count: usize,
    pub warning_count: usize,
}

impl ScheduleStats {
    pub fn compute(
        entries: &[SchedulingEntry],
        sessions: &[SessionCapacity],
        conflicts: &[Conflict],
    ) -> Self {
        let scheduled_entries = entries.iter().filter(|e| e.is_scheduled()).count();
        let error_count = conflicts.iter().filter(|c| c.is_error()).count();

        Self {
            total_entries: entries.len(),
            scheduled_entries,
            unscheduled_entries: entries.len() - scheduled_entries,
            total_sessions: sessions.len(),
            error_count,
            warning_count: conflicts.len() - error_count,
        }
    }
}

/// Reasons a schedule may not be published yet: every error conflict,
/// then every entry still lacking an entry number, scheduled or not.
/// Empty means the gate is open.
pub fn publish_blockers(validation: &ScheduleValidation, entries: &[SchedulingEntry]) -> Vec<String> {
    let mut blockers: Vec<String> = validation
        .errors()
        .map(|c| format!("{}: {}", c.kind, c.message))
        .collect();

    for entry in entries
        .iter()
        .filter(|e| e.entry_number.is_none())
    {
        blockers.push(format!(
            "UNNUMBERED_ENTRY: \"{}\" ({}) has no entry number",
            entry.title, entry.id
        ));
    }

    blockers
}
