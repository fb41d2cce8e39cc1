// ==========================================
// Competition Scheduler - Conflict Detector
// ==========================================
// Input:  entry snapshot + session capacities + constraints
// Output: itemized conflicts (severity + explanation)
// ==========================================
// Order: session order, then running-order position of the earlier
// entry of a pair; session-level conflicts close each session.
// Identical inputs always produce identical, identically-ordered output.
// Never fails: entries without timing only take part in the
// structural, capacity and window checks.
// ==========================================

use crate::domain::conflict::Conflict;
use crate::domain::constraints::SchedulingConstraints;
use crate::domain::entry::SchedulingEntry;
use crate::domain::session::SessionCapacity;
use crate::domain::types::ConflictKind;
use crate::engine::capacity::{effective_max_entries, entry_footprint};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use tracing::instrument;

/// Run every check over every session of the snapshot.
#[instrument(skip_all, fields(
    entries_count = entries.len(),
    sessions_count = sessions.len()
))]
pub fn get_all_conflicts(
    entries: &[SchedulingEntry],
    sessions: &[SessionCapacity],
    constraints: &SchedulingConstraints,
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    let mut seen_sessions: HashSet<&str> = HashSet::new();

    for session in sessions {
        if !seen_sessions.insert(session.session_id.as_str()) {
            continue;
        }
        conflicts.extend(detect_session_conflicts(session, entries, constraints));
    }

    // Entries pointing at sessions outside the snapshot
    for entry in entries {
        if let Some(session_id) = entry.session_id.as_deref() {
            if !seen_sessions.contains(session_id) {
                conflicts.push(
                    Conflict::error(
                        ConflictKind::UnknownSession,
                        format!(
                            "Entry \"{}\" is assigned to unknown session {}",
                            entry.title, session_id
                        ),
                    )
                    .with_entries([entry.id.as_str()])
                    .in_session(session_id),
                );
            }
        }
    }

    for entry in entries.iter().filter(|e| !e.is_scheduled()) {
        if let Some(number) = entry.entry_number {
            conflicts.push(
                Conflict::warning(
                    ConflictKind::UnscheduledButNumbered,
                    format!(
                        "Entry #{} \"{}\" has an entry number but no session",
                        number, entry.title
                    ),
                )
                .with_entries([entry.id.as_str()]),
            );
        }
    }

    tracing::debug!(conflicts_count = conflicts.len(), "conflict detection finished");
    conflicts
}

/// All conflicts of one session, in deterministic order.
pub fn detect_session_conflicts(
    session: &SessionCapacity,
    entries: &[SchedulingEntry],
    constraints: &SchedulingConstraints,
) -> Vec<Conflict> {
    let assigned = entries_in_running_order(session, entries);

    // (position of earlier entry, position of later entry, conflict)
    let mut pairwise: Vec<(usize, usize, Conflict)> = Vec::new();

    // ===== 0. structural =====
    for (pos, entry) in assigned.iter().enumerate() {
        if entry.running_order.is_none() {
            pairwise.push((
                pos,
                pos,
                Conflict::error(
                    ConflictKind::MissingRunningOrder,
                    format!(
                        "Entry \"{}\" is in session \"{}\" without a running order",
                        entry.title, session.session_name
                    ),
                )
                .with_entries([entry.id.as_str()])
                .in_session(&session.session_id),
            ));
        }
    }
    for (pos, pair) in assigned.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        if let (Some(ra), Some(rb)) = (a.running_order, b.running_order) {
            if ra == rb {
                pairwise.push((
                    pos,
                    pos + 1,
                    Conflict::error(
                        ConflictKind::DuplicateRunningOrder,
                        format!(
                            "Entries \"{}\" and \"{}\" share running order {} in session \"{}\"",
                            a.title, b.title, ra, session.session_name
                        ),
                    )
                    .with_entries([a.id.as_str(), b.id.as_str()])
                    .in_session(&session.session_id),
                ));
            }
        }
    }

    // ===== timed entries only from here =====
    let timed: Vec<(usize, &SchedulingEntry, NaiveDateTime)> = assigned
        .iter()
        .enumerate()
        .filter_map(|(pos, e)| e.performance_time.map(|t| (pos, *e, t)))
        .collect();

    // ===== 1. overlap / session buffer (adjacent by running order) =====
    let buffer_secs = minutes_to_secs(constraints.session_buffer);
    for pair in timed.windows(2) {
        let (prev_pos, prev, prev_start) = pair[0];
        let (next_pos, next, next_start) = pair[1];
        let prev_end = prev_start + chrono::Duration::minutes(i64::from(prev.duration));
        let gap_secs = (next_start - prev_end).num_seconds();

        if gap_secs < 0 {
            pairwise.push((
                prev_pos,
                next_pos,
                Conflict::error(
                    ConflictKind::OverlappingTime,
                    format!(
                        "\"{}\" starts {} min before \"{}\" ends",
                        next.title,
                        secs_to_minutes_ceil(-gap_secs),
                        prev.title
                    ),
                )
                .with_entries([prev.id.as_str(), next.id.as_str()])
                .in_session(&session.session_id),
            ));
        } else if gap_secs < buffer_secs {
            pairwise.push((
                prev_pos,
                next_pos,
                Conflict::warning(
                    ConflictKind::SessionBuffer,
                    format!(
                        "Only {} min between \"{}\" and \"{}\" (session buffer: {} min)",
                        gap_secs / 60,
                        prev.title,
                        next.title,
                        constraints.session_buffer
                    ),
                )
                .with_entries([prev.id.as_str(), next.id.as_str()])
                .in_session(&session.session_id),
            ));
        }
    }

    // ===== 2. costume change (every pair sharing a dancer) =====
    for i in 0..timed.len() {
        for j in (i + 1)..timed.len() {
            let (pos_i, entry_i, start_i) = timed[i];
            let (pos_j, entry_j, start_j) = timed[j];

            let shared = entry_i.shared_dancers(entry_j);
            if shared.is_empty() {
                continue;
            }

            // earlier by start time; running order breaks ties
            let ((earlier, earlier_start), (later, later_start)) =
                if (start_j, pos_j) < (start_i, pos_i) {
                    ((entry_j, start_j), (entry_i, start_i))
                } else {
                    ((entry_i, start_i), (entry_j, start_j))
                };

            let earlier_end = earlier_start + chrono::Duration::minutes(i64::from(earlier.duration));
            let gap_secs = (later_start - earlier_end).num_seconds();
            let required = constraints
                .min_costume_change_buffer
                .saturating_add(later.warm_up_time);

            if gap_secs < minutes_to_secs(required) {
                let names: Vec<&str> = shared.iter().map(|p| p.dancer_name.as_str()).collect();
                pairwise.push((
                    pos_i.min(pos_j),
                    pos_i.max(pos_j),
                    Conflict::error(
                        ConflictKind::CostumeChange,
                        format!(
                            "{} between \"{}\" and \"{}\": {} min available, {} min required ({} costume change + {} warm-up)",
                            names.join(", "),
                            earlier.title,
                            later.title,
                            gap_secs.div_euclid(60),
                            required,
                            constraints.min_costume_change_buffer,
                            later.warm_up_time
                        ),
                    )
                    .with_entries([earlier.id.as_str(), later.id.as_str()])
                    .with_dancers(shared.iter().map(|p| p.dancer_id.as_str()))
                    .in_session(&session.session_id),
                ));
            }
        }
    }

    // ===== 3. outside the session window =====
    let window_end = session.window_end();
    for &(pos, entry, start) in &timed {
        let end = start + chrono::Duration::minutes(i64::from(entry.duration));
        if start < session.start_time || end > window_end {
            pairwise.push((
                pos,
                pos,
                Conflict::error(
                    ConflictKind::OutsideSessionWindow,
                    format!(
                        "\"{}\" ({} - {}) falls outside session \"{}\" ({} - {})",
                        entry.title,
                        start.format("%H:%M"),
                        end.format("%H:%M"),
                        session.session_name,
                        session.start_time.format("%H:%M"),
                        window_end.format("%H:%M")
                    ),
                )
                .with_entries([entry.id.as_str()])
                .in_session(&session.session_id),
            ));
        }
    }

    pairwise.sort_by(|a, b| {
        (a.0, a.1, a.2.kind.rank()).cmp(&(b.0, b.1, b.2.kind.rank()))
    });
    let mut conflicts: Vec<Conflict> = pairwise.into_iter().map(|(_, _, c)| c).collect();

    // ===== 4. capacity =====
    let max_entries = effective_max_entries(session, constraints);
    if assigned.len() > max_entries as usize {
        conflicts.push(
            Conflict::error(
                ConflictKind::CapacityExceeded,
                format!(
                    "Session \"{}\" has {} entries (max: {})",
                    session.session_name,
                    assigned.len(),
                    max_entries
                ),
            )
            .with_entries(assigned.iter().map(|e| e.id.as_str()))
            .in_session(&session.session_id),
        );
    }

    // ===== 5. scheduling window =====
    let needed: u64 = assigned
        .iter()
        .map(|e| u64::from(entry_footprint(e, constraints)))
        .sum();
    if needed > u64::from(session.available_minutes) {
        conflicts.push(
            Conflict::error(
                ConflictKind::TimeOverflow,
                format!(
                    "Session \"{}\" requires {} minutes but only has {} available",
                    session.session_name, needed, session.available_minutes
                ),
            )
            .with_entries(assigned.iter().map(|e| e.id.as_str()))
            .in_session(&session.session_id),
        );
    }

    conflicts
}

/// Entries of a session sorted by running order; entries without a
/// running order come last, ids break every remaining tie.
pub fn entries_in_running_order<'a>(
    session: &SessionCapacity,
    entries: &'a [SchedulingEntry],
) -> Vec<&'a SchedulingEntry> {
    let mut assigned: Vec<&SchedulingEntry> = entries
        .iter()
        .filter(|e| e.is_in_session(&session.session_id))
        .collect();
    assigned.sort_by(|a, b| {
        (a.running_order.is_none(), a.running_order, &a.id)
            .cmp(&(b.running_order.is_none(), b.running_order, &b.id))
    });
    assigned
}

fn minutes_to_secs(minutes: u32) -> i64 {
    i64::from(minutes) * 60
}

fn secs_to_minutes_ceil(secs: i64) -> i64 {
    (secs + 59).div_euclid(60)
}
