// ==========================================
// Competition Scheduler - Domain Type Definitions
// ==========================================
// Enumerations shared by the engine, repositories and APIs.
// Serialized as SCREAMING_SNAKE_CASE (matches the database).
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Conflict severity
// ==========================================
// Error blocks publishing, Warning is surfaced only
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

// ==========================================
// Conflict kind
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    CostumeChange,          // shared dancer without enough change time
    SessionBuffer,          // consecutive entries closer than session_buffer
    OverlappingTime,        // consecutive entries overlap on stage
    OutsideSessionWindow,   // performance outside the session's time window
    CapacityExceeded,       // more entries than the effective max
    TimeOverflow,           // cumulative footprint exceeds available minutes
    MissingRunningOrder,    // assigned to a session without a running order
    DuplicateRunningOrder,  // two entries share a running order in one session
    UnknownSession,         // session id not present in the snapshot
    UnscheduledButNumbered, // entry number assigned but no session
}

impl ConflictKind {
    /// Conflict kinds produced by the pairwise/session checks share one list;
    /// this rank orders kinds for the same entry pair.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            ConflictKind::MissingRunningOrder => 0,
            ConflictKind::DuplicateRunningOrder => 1,
            ConflictKind::OverlappingTime => 2,
            ConflictKind::SessionBuffer => 3,
            ConflictKind::CostumeChange => 4,
            ConflictKind::OutsideSessionWindow => 5,
            ConflictKind::CapacityExceeded => 6,
            ConflictKind::TimeOverflow => 7,
            ConflictKind::UnknownSession => 8,
            ConflictKind::UnscheduledButNumbered => 9,
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConflictKind::CostumeChange => "COSTUME_CHANGE",
            ConflictKind::SessionBuffer => "SESSION_BUFFER",
            ConflictKind::OverlappingTime => "OVERLAPPING_TIME",
            ConflictKind::OutsideSessionWindow => "OUTSIDE_SESSION_WINDOW",
            ConflictKind::CapacityExceeded => "CAPACITY_EXCEEDED",
            ConflictKind::TimeOverflow => "TIME_OVERFLOW",
            ConflictKind::MissingRunningOrder => "MISSING_RUNNING_ORDER",
            ConflictKind::DuplicateRunningOrder => "DUPLICATE_RUNNING_ORDER",
            ConflictKind::UnknownSession => "UNKNOWN_SESSION",
            ConflictKind::UnscheduledButNumbered => "UNSCHEDULED_BUT_NUMBERED",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// Schedule state (per competition)
// ==========================================
// Draft:     free editing, no entry numbers
// Finalized: entry numbers locked, new placements get late suffixes
// Published: schedule locked, no scheduling mutations at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleState {
    Draft,
    Finalized,
    Published,
}

impl fmt::Display for ScheduleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ScheduleState {
    /// Parse the database representation. Unknown values yield `None`
    /// so a corrupted row never silently unlocks a schedule.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "DRAFT" => Some(ScheduleState::Draft),
            "FINALIZED" => Some(ScheduleState::Finalized),
            "PUBLISHED" => Some(ScheduleState::Published),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ScheduleState::Draft => "DRAFT",
            ScheduleState::Finalized => "FINALIZED",
            ScheduleState::Published => "PUBLISHED",
        }
    }

    /// A published schedule rejects auto-scheduling and session reassignment.
    pub fn is_locked(&self) -> bool {
        matches!(self, ScheduleState::Published)
    }

    /// Entry numbers are frozen once the schedule leaves draft.
    pub fn numbers_locked(&self) -> bool {
        !matches!(self, ScheduleState::Draft)
    }
}
