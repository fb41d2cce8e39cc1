// ==========================================
// Competition Scheduler - API errors
// ==========================================
// Repository / adapter errors are translated here into caller-facing
// errors. Every rejection carries an explicit reason.
// ==========================================

use crate::engine::adapter::AdapterError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // Schedule workflow
    // ==========================================
    /// Published schedules reject every scheduling mutation.
    #[error("schedule is locked: competition_id={competition_id}")]
    ScheduleLocked { competition_id: String },

    /// The publish gate found blockers (error conflicts, unnumbered entries).
    #[error("publish rejected: {reason}")]
    PublishRejected { reason: String, blockers: Vec<String> },

    #[error("invalid state transition: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ==========================================
    // Input / lookup
    // ==========================================
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid stored data: {0}")]
    DataError(String),

    // ==========================================
    // Concurrency
    // ==========================================
    #[error("optimistic lock failure: {0}")]
    OptimisticLockFailure(String),

    // ==========================================
    // Data access
    // ==========================================
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::OptimisticLockFailure {
                competition_id,
                expected,
                actual,
            } => ApiError::OptimisticLockFailure(format!(
                "schedule of competition {} was modified concurrently (expected revision={}, actual revision={})",
                competition_id, expected, actual
            )),
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("failed to acquire database lock: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("unique constraint violated: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("foreign key constraint violated: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::DataError(format!("field {}: {}", field, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<AdapterError> for ApiError {
    fn from(err: AdapterError) -> Self {
        ApiError::DataError(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
