// ==========================================
// API integration test environment
// ==========================================
// One temporary database per test, opened through AppState so the
// tests run against the same wiring as the binary.
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::Arc;
use tempfile::NamedTempFile;

use competition_scheduler::api::{PublishApi, SchedulingApi};
use competition_scheduler::app::AppState;
use competition_scheduler::config::ConfigManager;
use competition_scheduler::domain::{ConstraintOverrides, ScheduleState, SchedulingEntry};
use competition_scheduler::repository::{
    ActionLogRepository, CompetitionRepository, EntryRepository, SessionRepository,
};

use super::test_data_builder::{competition, EntryBuilder, SessionBuilder};

pub const ACTOR: &str = "tester";

pub struct ApiTestEnv {
    pub db_path: String,
    pub scheduling_api: Arc<SchedulingApi>,
    pub publish_api: Arc<PublishApi>,

    // Repositories (fixture setup / assertions)
    pub config_manager: Arc<ConfigManager>,
    pub competition_repo: Arc<CompetitionRepository>,
    pub session_repo: Arc<SessionRepository>,
    pub entry_repo: Arc<EntryRepository>,
    pub action_log_repo: Arc<ActionLogRepository>,

    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        competition_scheduler::logging::init_test();
        let (temp_file, db_path) = test_helpers::create_test_db()?;
        let state = AppState::new(db_path.clone())?;

        Ok(Self {
            db_path,
            scheduling_api: state.scheduling_api,
            publish_api: state.publish_api,
            config_manager: state.config_manager,
            competition_repo: state.competition_repo,
            session_repo: state.session_repo,
            entry_repo: state.entry_repo,
            action_log_repo: state.action_log_repo,
            _temp_file: temp_file,
        })
    }

    pub fn add_competition(&self, competition_id: &str, state: ScheduleState) {
        self.competition_repo
            .insert(&competition(competition_id, state))
            .expect("insert competition failed");
    }

    pub fn add_session(&self, builder: SessionBuilder) {
        self.session_repo
            .insert(&builder.build())
            .expect("insert session failed");
    }

    pub fn add_entry(&self, builder: EntryBuilder) {
        let (record, participants) = builder.build();
        self.entry_repo.insert(&record).expect("insert entry failed");
        if !participants.is_empty() {
            self.entry_repo
                .batch_insert_participants(&participants)
                .expect("insert participants failed");
        }
    }

    pub fn entry(&self, competition_id: &str, entry_id: &str) -> SchedulingEntry {
        self.scheduling_api
            .get_schedule(competition_id)
            .expect("load schedule failed")
            .entries
            .into_iter()
            .find(|e| e.id == entry_id)
            .expect("entry not found")
    }

    pub fn revision(&self, competition_id: &str) -> i64 {
        self.competition_repo
            .get(competition_id)
            .expect("load competition failed")
            .schedule_revision
    }

    pub fn state(&self, competition_id: &str) -> ScheduleState {
        self.competition_repo
            .get(competition_id)
            .expect("load competition failed")
            .schedule_state
    }
}

/// Small buffers so hand-computed timelines stay readable.
pub fn tight_overrides() -> ConstraintOverrides {
    ConstraintOverrides {
        min_costume_change_buffer: Some(10),
        session_buffer: Some(1),
        prefer_group_by_category: Some(false),
        ..Default::default()
    }
}

pub fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
