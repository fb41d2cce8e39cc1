// ==========================================
// Competition Scheduler - Auto-Scheduler
// ==========================================
// Input:  one session + entries already in it + candidate entries
// Output: placed entries (session/time/running order) + skipped entries
// ==========================================
// Greedy, forward-only placement:
// 1) cursor starts after the existing entries
// 2) candidates grouped by studio (precedence) or category, stable
// 3) per candidate: costume-change shift, capacity gate, window gate
// Placement never produces an overlap, a costume-change clash,
// a capacity overrun or a window overrun inside the session.
// ==========================================

use crate::domain::constraints::SchedulingConstraints;
use crate::domain::entry::SchedulingEntry;
use crate::domain::session::SessionCapacity;
use crate::engine::capacity::{effective_max_entries, entry_footprint};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::instrument;

// ==========================================
// Result types
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    /// Already assigned to the target session (or listed twice)
    AlreadyInSession,
    /// Session entry cap reached
    CapacityReached { max_entries: u32 },
    /// Footprint no longer fits the remaining minutes or the window end
    WindowExceeded {
        required_minutes: u32,
        remaining_minutes: i64,
    },
    /// Costume-change shift pushes the entry past the window end
    CostumeChangeExceedsWindow { blocking_entry_id: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyInSession => write!(f, "ALREADY_IN_SESSION"),
            SkipReason::CapacityReached { max_entries } => {
                write!(f, "CAPACITY_REACHED: max_entries={}", max_entries)
            }
            SkipReason::WindowExceeded {
                required_minutes,
                remaining_minutes,
            } => write!(
                f,
                "WINDOW_EXCEEDED: required_minutes={}, remaining_minutes={}",
                required_minutes, remaining_minutes
            ),
            SkipReason::CostumeChangeExceedsWindow { blocking_entry_id } => write!(
                f,
                "COSTUME_CHANGE_EXCEEDS_WINDOW: blocking_entry={}",
                blocking_entry_id
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub entry_id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoScheduleResult {
    pub scheduled: Vec<SchedulingEntry>,
    pub skipped: Vec<SkippedEntry>,
}

impl AutoScheduleResult {
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

// ==========================================
// Placement
// ==========================================

/// Place `candidates` into `session` after the entries it already holds.
///
/// `existing` may contain entries of other sessions; only those assigned
/// to `session` are taken into account. Returned entries are copies of the
/// candidates with `session_id`, `performance_time` and `running_order` set.
#[instrument(skip(existing, candidates, constraints), fields(
    session_id = %session.session_id,
    existing_count = existing.len(),
    candidates_count = candidates.len()
))]
pub fn auto_schedule_session(
    session: &SessionCapacity,
    existing: &[SchedulingEntry],
    candidates: &[SchedulingEntry],
    constraints: &SchedulingConstraints,
) -> AutoScheduleResult {
    let mut result = AutoScheduleResult::default();

    let in_session: Vec<&SchedulingEntry> = existing
        .iter()
        .filter(|e| e.is_in_session(&session.session_id))
        .collect();

    // ===== 1. starting point =====
    let max_entries = effective_max_entries(session, constraints);
    let buffer = Duration::minutes(i64::from(constraints.session_buffer));
    let window_end = session.window_end();

    let mut entry_count = in_session.len();
    let mut used_minutes: i64 = in_session
        .iter()
        .map(|e| i64::from(entry_footprint(e, constraints)))
        .sum();

    let stacked_minutes: i64 = in_session
        .iter()
        .map(|e| i64::from(e.duration) + i64::from(constraints.session_buffer))
        .sum();
    let mut cursor = session.start_time + Duration::minutes(stacked_minutes);
    if let Some(latest_end) = in_session.iter().filter_map(|e| e.end_time()).max() {
        cursor = cursor.max(latest_end + buffer);
    }

    let max_order = in_session
        .iter()
        .filter_map(|e| e.running_order)
        .max()
        .unwrap_or(0);
    let mut next_order = max_order
        .max(u32::try_from(entry_count).unwrap_or(u32::MAX))
        .saturating_add(1);

    let mut taken: HashSet<&str> = in_session.iter().map(|e| e.id.as_str()).collect();

    // ===== 2. candidate order =====
    let ordered = order_candidates(candidates, constraints);

    // ===== 3. greedy placement =====
    for candidate in ordered {
        if candidate.is_in_session(&session.session_id) || !taken.insert(candidate.id.as_str()) {
            skip(&mut result, candidate, SkipReason::AlreadyInSession);
            continue;
        }

        // costume change vs. every timed entry sharing a dancer
        let mut start = cursor;
        let mut blocking: Option<&str> = None;
        let timed_before = in_session
            .iter()
            .copied()
            .chain(result.scheduled.iter())
            .filter(|e| e.performance_time.is_some());
        for other in timed_before {
            if candidate.shared_dancers(other).is_empty() {
                continue;
            }
            if let Some(other_end) = other.end_time() {
                let required = other_end
                    + Duration::minutes(i64::from(
                        constraints
                            .min_costume_change_buffer
                            .saturating_add(candidate.warm_up_time),
                    ));
                if required > start {
                    start = required;
                    blocking = Some(other.id.as_str());
                }
            }
        }
        let blocking = blocking.map(str::to_string);

        if entry_count >= max_entries as usize {
            // capacity frees no slot for later candidates either
            skip(&mut result, candidate, SkipReason::CapacityReached { max_entries });
            continue;
        }

        let footprint = entry_footprint(candidate, constraints);
        let remaining_minutes = i64::from(session.available_minutes) - used_minutes;
        let end = start + Duration::minutes(i64::from(candidate.duration));

        if i64::from(footprint) > remaining_minutes {
            skip(
                &mut result,
                candidate,
                SkipReason::WindowExceeded {
                    required_minutes: footprint,
                    remaining_minutes,
                },
            );
            continue;
        }
        if end > window_end {
            let reason = match blocking {
                Some(blocking_entry_id) if fits_without_shift(cursor, candidate, window_end) => {
                    SkipReason::CostumeChangeExceedsWindow { blocking_entry_id }
                }
                _ => SkipReason::WindowExceeded {
                    required_minutes: footprint,
                    remaining_minutes,
                },
            };
            skip(&mut result, candidate, reason);
            continue;
        }

        tracing::debug!(
            entry_id = %candidate.id,
            start = %start.format("%H:%M"),
            running_order = next_order,
            "entry placed"
        );
        result
            .scheduled
            .push(candidate.placed(&session.session_id, start, next_order));

        next_order = next_order.saturating_add(1);
        entry_count += 1;
        used_minutes += i64::from(footprint);
        cursor = end + buffer;
    }

    tracing::info!(
        session_id = %session.session_id,
        scheduled = result.scheduled_count(),
        skipped = result.skipped_count(),
        "auto-schedule finished"
    );
    result
}

/// Candidate order: studio grouping wins over category grouping;
/// both are stable so the caller's order survives inside a group.
fn order_candidates<'a>(
    candidates: &'a [SchedulingEntry],
    constraints: &SchedulingConstraints,
) -> Vec<&'a SchedulingEntry> {
    let mut ordered: Vec<&SchedulingEntry> = candidates.iter().collect();
    if constraints.prefer_group_by_studio {
        ordered.sort_by(|a, b| a.studio_id.cmp(&b.studio_id));
    } else if constraints.prefer_group_by_category {
        ordered.sort_by(|a, b| a.category_id.cmp(&b.category_id));
    }
    ordered
}

fn fits_without_shift(cursor: NaiveDateTime, candidate: &SchedulingEntry, window_end: NaiveDateTime) -> bool {
    cursor + Duration::minutes(i64::from(candidate.duration)) <= window_end
}

fn skip(result: &mut AutoScheduleResult, candidate: &SchedulingEntry, reason: SkipReason) {
    tracing::debug!(entry_id = %candidate.id, reason = %reason, "entry skipped");
    result.skipped.push(SkippedEntry {
        entry_id: candidate.id.clone(),
        reason,
    });
}
