// ==========================================
// Competition Scheduler - Application state
// ==========================================
// Wires one shared SQLite connection into the repositories,
// the config manager and the API instances.
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ApiError, ApiResult, PublishApi, SchedulingApi, SnapshotLoader};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{
    ActionLogRepository, CompetitionRepository, EntryRepository, ScheduleWriteRepository,
    SessionRepository,
};

/// Env override for the database location.
pub const DB_PATH_ENV: &str = "COMPETITION_SCHEDULER_DB_PATH";

/// Shared application state: API instances plus the repositories the
/// callers need for seeding and audit queries.
pub struct AppState {
    pub db_path: String,

    pub scheduling_api: Arc<SchedulingApi>,
    pub publish_api: Arc<PublishApi>,

    pub config_manager: Arc<ConfigManager>,
    pub competition_repo: Arc<CompetitionRepository>,
    pub session_repo: Arc<SessionRepository>,
    pub entry_repo: Arc<EntryRepository>,

    /// Audit trail of schedule writes
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AppState {
    /// Open (or create) the database at `db_path` and build every layer on top of it.
    pub fn new(db_path: String) -> ApiResult<Self> {
        tracing::info!(db_path = %db_path, "initializing AppState");

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| ApiError::DatabaseError(format!("failed to open database: {}", e)))?;
        init_schema(&conn)
            .map_err(|e| ApiError::DatabaseError(format!("failed to initialize schema: {}", e)))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // Repositories
        // ==========================================
        let competition_repo = Arc::new(CompetitionRepository::new(conn.clone()));
        let session_repo = Arc::new(SessionRepository::new(conn.clone()));
        let entry_repo = Arc::new(EntryRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));
        let write_repo = Arc::new(ScheduleWriteRepository::new(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| ApiError::ConfigError(e.to_string()))?,
        );

        // ==========================================
        // APIs
        // ==========================================
        let loader = Arc::new(SnapshotLoader::new(
            competition_repo.clone(),
            session_repo.clone(),
            entry_repo.clone(),
        ));

        let scheduling_api = Arc::new(SchedulingApi::new(
            loader.clone(),
            config_manager.clone(),
            write_repo.clone(),
        ));
        let publish_api = Arc::new(PublishApi::new(loader, config_manager.clone(), write_repo));

        tracing::info!("AppState initialized");

        Ok(Self {
            db_path,
            scheduling_api,
            publish_api,
            config_manager,
            competition_repo,
            session_repo,
            entry_repo,
            action_log_repo,
        })
    }
}

/// Default database path.
///
/// `COMPETITION_SCHEDULER_DB_PATH` wins when set; otherwise the user data
/// directory is used, falling back to the working directory.
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./competition_scheduler.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("competition-scheduler");
        // best-effort: an unwritable data dir surfaces later as an open error
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("competition_scheduler.db");
        }
    }

    path.to_string_lossy().to_string()
}
