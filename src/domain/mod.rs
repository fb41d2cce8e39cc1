// ==========================================
// Competition Scheduler - Domain Layer
// ==========================================
// Entities, value types and persisted record shapes.
// No data access, no engine logic.
// ==========================================

pub mod action_log;
pub mod competition;
pub mod conflict;
pub mod constraints;
pub mod entry;
pub mod entry_number;
pub mod records;
pub mod session;
pub mod types;

pub use action_log::{ScheduleActionLog, ScheduleActionType};
pub use competition::Competition;
pub use conflict::Conflict;
pub use constraints::{ConstraintOverrides, SchedulingConstraints, DEFAULT_CONSTRAINTS};
pub use entry::{Participant, SchedulingEntry};
pub use entry_number::{EntryNumber, ParseEntryNumberError, ENTRY_NUMBER_START};
pub use records::{EntryRecord, ParticipantRecord, SessionRecord};
pub use session::{SessionCapacity, SessionWindow, DEFAULT_SESSION_MINUTES};
pub use types::{ConflictKind, ScheduleState, Severity};
