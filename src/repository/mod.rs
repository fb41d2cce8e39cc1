// ==========================================
// Competition Scheduler - Repository Layer
// ==========================================
// Data access only, no scheduling rules.
// All queries are parameterized.
// ==========================================

pub mod action_log_repo;
pub mod competition_repo;
pub mod entry_repo;
pub mod error;
pub mod schedule_write_repo;
pub mod session_repo;

pub use action_log_repo::ActionLogRepository;
pub use competition_repo::CompetitionRepository;
pub use entry_repo::EntryRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use schedule_write_repo::{
    NumberAssignment, ScheduleWrite, ScheduleWriteRepository, SlotAssignment,
};
pub use session_repo::SessionRepository;
