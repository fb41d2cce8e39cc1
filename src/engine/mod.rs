// ==========================================
// Competition Scheduler - Engine Layer
// ==========================================
// Pure scheduling rules: no SQL, no I/O, no shared state.
// Every rejected placement and every conflict carries a reason.
// ==========================================

pub mod adapter;
pub mod auto_scheduler;
pub mod capacity;
pub mod conflict_detector;
pub mod entry_numbering;
pub mod schedule_validator;

pub use adapter::{
    to_scheduling_entries, to_scheduling_entry, to_session_capacity, AdapterError, AdapterResult,
    DEFAULT_ROUTINE_DURATION_MINUTES, DEFAULT_WARM_UP_MINUTES,
};
pub use auto_scheduler::{auto_schedule_session, AutoScheduleResult, SkipReason, SkippedEntry};
pub use capacity::{
    compute_capacity, effective_max_entries, entry_footprint, refresh_entry_count,
    remaining_minutes, remaining_slots, session_stats, SessionStats,
};
pub use conflict_detector::{detect_session_conflicts, get_all_conflicts};
pub use entry_numbering::{assign_entry_numbers, competition_order, late_entry_number};
pub use schedule_validator::{publish_blockers, validate_schedule, ScheduleStats, ScheduleValidation};
