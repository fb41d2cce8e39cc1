// ==========================================
// Competition Scheduler - Session Capacity Calculator
// ==========================================
// Derives available minutes / remaining slots of a session from
// its time window and the entries already assigned to it.
// Pure, total: a missing end time is a defined default, not an error.
// ==========================================

use crate::domain::constraints::SchedulingConstraints;
use crate::domain::entry::SchedulingEntry;
use crate::domain::session::{SessionCapacity, SessionWindow, DEFAULT_SESSION_MINUTES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Build the capacity view of a session.
///
/// `available_minutes` is the whole-minute span `end - start`, or
/// [`DEFAULT_SESSION_MINUTES`] when the end is open. An inverted window
/// clamps to zero.
pub fn compute_capacity(
    window: &SessionWindow,
    max_entries: Option<u32>,
    current_entry_count: u32,
) -> SessionCapacity {
    let available_minutes = match window.end_time {
        Some(end) => {
            let minutes = (end - window.start_time).num_minutes();
            u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
        }
        None => DEFAULT_SESSION_MINUTES,
    };

    SessionCapacity {
        session_id: window.session_id.clone(),
        session_name: window.session_name.clone(),
        session_date: window.session_date,
        start_time: window.start_time,
        end_time: window.end_time,
        max_entries,
        current_entry_count,
        available_minutes,
    }
}

/// Recompute `current_entry_count` from the snapshot; the stored value
/// is not authoritative.
pub fn refresh_entry_count(session: &SessionCapacity, entries: &[SchedulingEntry]) -> SessionCapacity {
    let count = entries
        .iter()
        .filter(|e| e.is_in_session(&session.session_id))
        .count();
    SessionCapacity {
        current_entry_count: u32::try_from(count).unwrap_or(u32::MAX),
        ..session.clone()
    }
}

/// Session-specific cap if set, otherwise the constraint default.
pub fn effective_max_entries(session: &SessionCapacity, constraints: &SchedulingConstraints) -> u32 {
    session
        .max_entries
        .unwrap_or(constraints.max_entries_per_session)
}

/// Minutes an entry consumes from a session's budget:
/// warm-up + performance + trailing session buffer.
pub fn entry_footprint(entry: &SchedulingEntry, constraints: &SchedulingConstraints) -> u32 {
    entry
        .warm_up_time
        .saturating_add(entry.duration)
        .saturating_add(constraints.session_buffer)
}

pub fn remaining_slots(session: &SessionCapacity, constraints: &SchedulingConstraints) -> u32 {
    effective_max_entries(session, constraints).saturating_sub(session.current_entry_count)
}

/// Available minutes minus the footprint of assigned entries (may be negative).
pub fn remaining_minutes(
    session: &SessionCapacity,
    entries: &[SchedulingEntry],
    constraints: &SchedulingConstraints,
) -> i64 {
    i64::from(session.available_minutes) - used_minutes(session, entries, constraints)
}

fn used_minutes(
    session: &SessionCapacity,
    entries: &[SchedulingEntry],
    constraints: &SchedulingConstraints,
) -> i64 {
    entries
        .iter()
        .filter(|e| e.is_in_session(&session.session_id))
        .map(|e| i64::from(entry_footprint(e, constraints)))
        .sum()
}

// ==========================================
// SessionStats - dashboard statistics
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub session_id: String,
    pub entry_count: u32,
    pub total_minutes: i64,
    pub available_minutes: u32,
    pub utilization_percent: u32,
    pub remaining_minutes: i64,
    pub remaining_slots: u32,
    pub studio_breakdown: BTreeMap<String, u32>,
    pub category_breakdown: BTreeMap<String, u32>,
}

pub fn session_stats(
    session: &SessionCapacity,
    entries: &[SchedulingEntry],
    constraints: &SchedulingConstraints,
) -> SessionStats {
    let session = refresh_entry_count(session, entries);
    let total_minutes = used_minutes(&session, entries, constraints);

    let utilization_percent = if session.available_minutes > 0 {
        let pct = (total_minutes as f64 / f64::from(session.available_minutes) * 100.0).round();
        pct.max(0.0) as u32
    } else {
        0
    };

    let mut studio_breakdown = BTreeMap::new();
    let mut category_breakdown = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.is_in_session(&session.session_id)) {
        *studio_breakdown.entry(entry.studio_name.clone()).or_insert(0) += 1;
        *category_breakdown.entry(entry.category_name.clone()).or_insert(0) += 1;
    }

    SessionStats {
        session_id: session.session_id.clone(),
        entry_count: session.current_entry_count,
        total_minutes,
        available_minutes: session.available_minutes,
        utilization_percent,
        remaining_minutes: remaining_minutes(&session, entries, constraints),
        remaining_slots: remaining_slots(&session, constraints),
        studio_breakdown,
        category_breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constraints::DEFAULT_CONSTRAINTS;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn window(end: Option<NaiveDateTime>) -> SessionWindow {
        SessionWindow {
            session_id: "S1".to_string(),
            session_name: "Saturday AM".to_string(),
            session_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            start_time: at(9, 0),
            end_time: end,
        }
    }

    fn entry(id: &str, studio: &str, duration: u32, warm_up: u32) -> SchedulingEntry {
        SchedulingEntry {
            id: id.to_string(),
            title: format!("Routine {}", id),
            studio_id: studio.to_string(),
            studio_name: format!("Studio {}", studio),
            category_id: "JAZZ".to_string(),
            category_name: "Jazz".to_string(),
            age_group_id: "TEEN".to_string(),
            age_group_name: "Teen".to_string(),
            entry_size_category_id: "SOLO".to_string(),
            duration,
            warm_up_time: warm_up,
            session_id: Some("S1".to_string()),
            performance_time: None,
            running_order: None,
            entry_number: None,
            participants: Vec::new(),
        }
    }

    #[test]
    fn test_available_minutes_from_window() {
        let cap = compute_capacity(&window(Some(at(12, 30))), Some(30), 0);
        assert_eq!(cap.available_minutes, 210);
        assert_eq!(cap.window_end(), at(12, 30));
    }

    #[test]
    fn test_open_end_defaults_to_240_minutes() {
        let cap = compute_capacity(&window(None), None, 0);
        assert_eq!(cap.available_minutes, 240);
        assert_eq!(cap.window_end(), at(13, 0));
    }

    #[test]
    fn test_inverted_window_clamps_to_zero() {
        let cap = compute_capacity(&window(Some(at(8, 0))), None, 0);
        assert_eq!(cap.available_minutes, 0);
    }

    #[test]
    fn test_effective_max_and_remaining_slots() {
        let constraints = DEFAULT_CONSTRAINTS;
        let capped = compute_capacity(&window(None), Some(2), 1);
        let uncapped = compute_capacity(&window(None), None, 1);

        assert_eq!(effective_max_entries(&capped, &constraints), 2);
        assert_eq!(effective_max_entries(&uncapped, &constraints), 50);
        assert_eq!(remaining_slots(&capped, &constraints), 1);
        assert_eq!(remaining_slots(&uncapped, &constraints), 49);
    }

    #[test]
    fn test_session_stats_breakdown() {
        let constraints = SchedulingConstraints {
            session_buffer: 1,
            ..DEFAULT_CONSTRAINTS
        };
        let session = compute_capacity(&window(Some(at(10, 0))), None, 0);
        let mut other = entry("E9", "B", 3, 0);
        other.session_id = Some("S2".to_string());
        let entries = vec![entry("E1", "A", 3, 0), entry("E2", "A", 3, 2), other];

        let stats = session_stats(&session, &entries, &constraints);
        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.total_minutes, 4 + 6);
        assert_eq!(stats.remaining_minutes, 50);
        assert_eq!(stats.utilization_percent, 17);
        assert_eq!(stats.studio_breakdown.get("Studio A"), Some(&2));
        assert_eq!(stats.category_breakdown.get("Jazz"), Some(&2));
        assert_eq!(stats.remaining_slots, 48);
    }

    #[test]
    fn test_remaining_minutes_goes_negative_when_overbooked() {
        let constraints = SchedulingConstraints {
            session_buffer: 1,
            ..DEFAULT_CONSTRAINTS
        };
        let session = compute_capacity(&window(Some(at(9, 10))), None, 0);
        let entries = vec![entry("E1", "A", 3, 2), entry("E2", "A", 0, 0)];
        assert_eq!(remaining_minutes(&session, &entries, &constraints), 10 - 6 - 1);

        let crowded = vec![entry("E1", "A", 3, 2), entry("E2", "B", 3, 2), entry("E3", "C", 0, 0)];
        assert_eq!(remaining_minutes(&session, &crowded, &constraints), -3);
        assert_eq!(session_stats(&session, &crowded, &constraints).remaining_minutes, -3);
    }
}
