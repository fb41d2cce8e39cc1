// ==========================================
// Competition Scheduler - Core library
// ==========================================
// Dance competition scheduling engine:
// conflict detection, capacity-aware auto-placement,
// entry numbering and the finalize / publish workflow.
// Storage: SQLite (rusqlite)
// ==========================================

// ==========================================
// Modules
// ==========================================

// Domain - entities and value types
pub mod domain;

// Repository - data access
pub mod repository;

// Engine - scheduling rules
pub mod engine;

// Config - layered scheduling constraints
pub mod config;

// Database bootstrap (connection PRAGMAs, schema)
pub mod db;

// Logging
pub mod logging;

// API - workflow entry points
pub mod api;

// Application state
pub mod app;

// ==========================================
// Re-exports
// ==========================================

pub use domain::types::{ConflictKind, ScheduleState, Severity};

pub use domain::{
    Competition, Conflict, ConstraintOverrides, EntryNumber, Participant, SchedulingConstraints,
    SchedulingEntry, SessionCapacity, SessionWindow, DEFAULT_CONSTRAINTS,
};

pub use engine::{
    auto_schedule_session, get_all_conflicts, validate_schedule, AutoScheduleResult, SkipReason,
};

pub use api::{ApiError, ApiResult, PublishApi, SchedulingApi};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Competition Scheduler";
