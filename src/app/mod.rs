// ==========================================
// Competition Scheduler - Application Layer
// ==========================================
// Builds the shared state the entry points run against.
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
