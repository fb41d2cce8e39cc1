// ==========================================
// Competition Scheduler - Schedule action log repository
// ==========================================
// schedule_action_log table: one row per schedule write
// ==========================================

mod core;
mod queries;


pub use core::ActionLogRepository;
pub(crate) use core::insert_action_log;
