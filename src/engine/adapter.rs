// ==========================================
// Competition Scheduler - Entry/Session Model Adapters
// ==========================================
// Persisted records -> engine value types.
// All validation of loosely typed storage data happens here so the
// engine never sees negative minutes or malformed numbers.
// ==========================================

use crate::domain::entry::{Participant, SchedulingEntry};
use crate::domain::entry_number::EntryNumber;
use crate::domain::records::{EntryRecord, ParticipantRecord, SessionRecord};
use crate::domain::session::{SessionCapacity, SessionWindow};
use crate::engine::capacity::compute_capacity;
use thiserror::Error;

/// Performance length used when the entry has none recorded
pub const DEFAULT_ROUTINE_DURATION_MINUTES: u32 = 3;

/// Warm-up used when the entry has none recorded
pub const DEFAULT_WARM_UP_MINUTES: u32 = 15;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("missing field {field} on {entity}")]
    MissingField { entity: String, field: String },

    #[error("negative minutes (field={field}, id={id}): {value}")]
    NegativeMinutes { id: String, field: String, value: i64 },

    #[error("value out of range (field={field}, id={id}): {value}")]
    OutOfRange { id: String, field: String, value: i64 },

    #[error("invalid entry number on entry {id}: {raw}")]
    InvalidEntryNumber { id: String, raw: String },

    #[error("session {session_id} ends before it starts")]
    InvalidSessionWindow { session_id: String },
}

pub type AdapterResult<T> = Result<T, AdapterError>;

// ==========================================
// Entries
// ==========================================

/// Convert one entry row and its participant rows.
///
/// Participants belonging to other entries are ignored; duplicate
/// dancer rows collapse to the first occurrence.
pub fn to_scheduling_entry(
    record: EntryRecord,
    participants: &[ParticipantRecord],
) -> AdapterResult<SchedulingEntry> {
    if record.entry_id.trim().is_empty() {
        return Err(AdapterError::MissingField {
            entity: "entry".to_string(),
            field: "entry_id".to_string(),
        });
    }

    let duration = minutes_or_default(
        &record.entry_id,
        "duration_minutes",
        record.duration_minutes,
        DEFAULT_ROUTINE_DURATION_MINUTES,
    )?;
    let warm_up_time = minutes_or_default(
        &record.entry_id,
        "warm_up_minutes",
        record.warm_up_minutes,
        DEFAULT_WARM_UP_MINUTES,
    )?;

    let running_order = match record.running_order {
        Some(v) => Some(positive_u32(&record.entry_id, "running_order", v)?),
        None => None,
    };

    let entry_number = parse_entry_number(&record)?;

    let mut roster: Vec<Participant> = Vec::new();
    for p in participants.iter().filter(|p| p.entry_id == record.entry_id) {
        if roster.iter().any(|r| r.dancer_id == p.dancer_id) {
            continue;
        }
        let dancer_age = match p.dancer_age {
            Some(age) => Some(non_negative_u32(&record.entry_id, "dancer_age", age)?),
            None => None,
        };
        roster.push(Participant {
            dancer_id: p.dancer_id.clone(),
            dancer_name: p.dancer_name.clone(),
            dancer_age,
        });
    }

    Ok(SchedulingEntry {
        id: record.entry_id,
        title: record.title,
        studio_id: record.studio_id,
        studio_name: record.studio_name,
        category_id: record.category_id,
        category_name: record.category_name,
        age_group_id: record.age_group_id,
        age_group_name: record.age_group_name,
        entry_size_category_id: record.entry_size_category_id,
        duration,
        warm_up_time,
        session_id: record.session_id.filter(|s| !s.trim().is_empty()),
        performance_time: record.performance_time,
        running_order,
        entry_number,
        participants: roster,
    })
}

/// Convert a batch of entry rows, attaching each entry's participants.
pub fn to_scheduling_entries(
    records: Vec<EntryRecord>,
    participants: &[ParticipantRecord],
) -> AdapterResult<Vec<SchedulingEntry>> {
    records
        .into_iter()
        .map(|r| to_scheduling_entry(r, participants))
        .collect()
}

fn parse_entry_number(record: &EntryRecord) -> AdapterResult<Option<EntryNumber>> {
    let Some(number) = record.entry_number else {
        return Ok(None);
    };
    let suffix = record.entry_suffix.as_deref().unwrap_or("").trim();
    let raw = format!("{}{}", number, suffix);
    raw.parse::<EntryNumber>()
        .map(Some)
        .map_err(|_| AdapterError::InvalidEntryNumber {
            id: record.entry_id.clone(),
            raw,
        })
}

// ==========================================
// Sessions
// ==========================================

/// Convert one session row. `assigned_count` is the number of entries
/// currently assigned to the session in storage.
pub fn to_session_capacity(record: SessionRecord, assigned_count: u32) -> AdapterResult<SessionCapacity> {
    if let Some(end) = record.end_time {
        if end < record.start_time {
            return Err(AdapterError::InvalidSessionWindow {
                session_id: record.session_id,
            });
        }
    }

    let max_entries = match record.max_entries {
        Some(v) => Some(non_negative_u32(&record.session_id, "max_entries", v)?),
        None => None,
    };

    let session_name = match record.session_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => format!("Session {}", record.session_number),
    };

    let window = SessionWindow {
        session_id: record.session_id,
        session_name,
        session_date: record.session_date,
        start_time: record.start_time,
        end_time: record.end_time,
    };

    Ok(compute_capacity(&window, max_entries, assigned_count))
}

// ==========================================
// Helpers
// ==========================================

fn minutes_or_default(id: &str, field: &str, value: Option<i64>, default: u32) -> AdapterResult<u32> {
    match value {
        None => Ok(default),
        Some(v) if v < 0 => Err(AdapterError::NegativeMinutes {
            id: id.to_string(),
            field: field.to_string(),
            value: v,
        }),
        Some(v) => non_negative_u32(id, field, v),
    }
}

fn non_negative_u32(id: &str, field: &str, value: i64) -> AdapterResult<u32> {
    u32::try_from(value).map_err(|_| AdapterError::OutOfRange {
        id: id.to_string(),
        field: field.to_string(),
        value,
    })
}

fn positive_u32(id: &str, field: &str, value: i64) -> AdapterResult<u32> {
    match non_negative_u32(id, field, value)? {
        0 => Err(AdapterError::OutOfRange {
            id: id.to_string(),
            field: field.to_string(),
            value,
        }),
        v => Ok(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str) -> EntryRecord {
        EntryRecord {
            entry_id: id.to_string(),
            competition_id: "C1".to_string(),
            title: "Firebird".to_string(),
            studio_id: "ST1".to_string(),
            studio_name: "Studio One".to_string(),
            ..Default::default()
        }
    }

    fn participant(entry_id: &str, dancer_id: &str) -> ParticipantRecord {
        ParticipantRecord {
            entry_id: entry_id.to_string(),
            dancer_id: dancer_id.to_string(),
            dancer_name: format!("Dancer {}", dancer_id),
            dancer_age: Some(12),
        }
    }

    #[test]
    fn test_defaults_for_missing_minutes() {
        let entry = to_scheduling_entry(record("E1"), &[]).unwrap();
        assert_eq!(entry.duration, DEFAULT_ROUTINE_DURATION_MINUTES);
        assert_eq!(entry.warm_up_time, DEFAULT_WARM_UP_MINUTES);
        assert!(entry.session_id.is_none());
    }

    #[test]
    fn test_zero_duration_is_kept() {
        let mut r = record("E1");
        r.duration_minutes = Some(0);
        r.warm_up_minutes = Some(0);
        let entry = to_scheduling_entry(r, &[]).unwrap();
        assert_eq!(entry.duration, 0);
        assert_eq!(entry.warm_up_time, 0);
    }

    #[test]
    fn test_negative_duration_rejected() {
        let mut r = record("E1");
        r.duration_minutes = Some(-2);
        let err = to_scheduling_entry(r, &[]).unwrap_err();
        assert!(matches!(err, AdapterError::NegativeMinutes { value: -2, .. }));
    }

    #[test]
    fn test_participants_are_filtered_and_deduplicated() {
        let rows = vec![
            participant("E1", "D1"),
            participant("E2", "D2"),
            participant("E1", "D1"),
            participant("E1", "D3"),
        ];
        let entry = to_scheduling_entry(record("E1"), &rows).unwrap();
        let ids: Vec<&str> = entry.participants.iter().map(|p| p.dancer_id.as_str()).collect();
        assert_eq!(ids, vec!["D1", "D3"]);
    }

    #[test]
    fn test_entry_number_with_suffix() {
        let mut r = record("E1");
        r.entry_number = Some(156);
        r.entry_suffix = Some("a".to_string());
        let entry = to_scheduling_entry(r, &[]).unwrap();
        assert_eq!(entry.entry_number, Some(EntryNumber::late(156, 'a')));

        let mut bad = record("E2");
        bad.entry_number = Some(157);
        bad.entry_suffix = Some("AB".to_string());
        assert!(matches!(
            to_scheduling_entry(bad, &[]),
            Err(AdapterError::InvalidEntryNumber { .. })
        ));
    }

    #[test]
    fn test_session_conversion() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let rec = SessionRecord {
            session_id: "S1".to_string(),
            competition_id: "C1".to_string(),
            session_number: 3,
            session_name: None,
            session_date: day,
            start_time: day.and_hms_opt(9, 0, 0).unwrap(),
            end_time: Some(day.and_hms_opt(10, 0, 0).unwrap()),
            max_entries: Some(2),
        };
        let cap = to_session_capacity(rec.clone(), 1).unwrap();
        assert_eq!(cap.session_name, "Session 3");
        assert_eq!(cap.available_minutes, 60);
        assert_eq!(cap.max_entries, Some(2));
        assert_eq!(cap.current_entry_count, 1);

        let inverted = SessionRecord {
            end_time: Some(day.and_hms_opt(8, 0, 0).unwrap()),
            ..rec
        };
        assert!(matches!(
            to_session_capacity(inverted, 0),
            Err(AdapterError::InvalidSessionWindow { .. })
        ));
    }
}
