// ==========================================
// Competition Scheduler - Config Manager
// ==========================================
// Constraint layering:
//   DEFAULT_CONSTRAINTS -> global scope -> competition scope -> per-call overrides
// Storage: config_kv table (scope_id + key -> value)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::constraints::{ConstraintOverrides, SchedulingConstraints, DEFAULT_CONSTRAINTS};
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigScope
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigScope {
    Global,
    Competition { competition_id: String },
}

impl ConfigScope {
    pub fn competition(competition_id: &str) -> Self {
        ConfigScope::Competition {
            competition_id: competition_id.to_string(),
        }
    }

    pub fn scope_id(&self) -> &str {
        match self {
            ConfigScope::Global => "global",
            ConfigScope::Competition { competition_id } => competition_id,
        }
    }
}

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Reuse an existing connection; the shared PRAGMA set is re-applied (idempotent).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("failed to acquire lock: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_config_value(&self, scope: &ConfigScope, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("failed to acquire lock: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![scope.scope_id(), key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(&ConfigScope::Global, key)
    }

    /// Upsert one value.
    pub fn set_config_value(&self, scope: &ConfigScope, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("failed to acquire lock: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![scope.scope_id(), key, value],
        )?;
        Ok(())
    }

    /// Store every set field of `overrides` under `scope`.
    pub fn save_constraint_overrides(
        &self,
        scope: &ConfigScope,
        overrides: &ConstraintOverrides,
    ) -> Result<usize, Box<dyn Error>> {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(v) = overrides.min_costume_change_buffer {
            pairs.push((config_keys::MIN_COSTUME_CHANGE_BUFFER, v.to_string()));
        }
        if let Some(v) = overrides.session_buffer {
            pairs.push((config_keys::SESSION_BUFFER, v.to_string()));
        }
        if let Some(v) = overrides.max_entries_per_session {
            pairs.push((config_keys::MAX_ENTRIES_PER_SESSION, v.to_string()));
        }
        if let Some(v) = overrides.prefer_group_by_studio {
            pairs.push((config_keys::PREFER_GROUP_BY_STUDIO, v.to_string()));
        }
        if let Some(v) = overrides.prefer_group_by_category {
            pairs.push((config_keys::PREFER_GROUP_BY_CATEGORY, v.to_string()));
        }

        for (key, value) in &pairs {
            self.set_config_value(scope, key, value)?;
        }
        Ok(pairs.len())
    }

    // ===== Scheduling constraints =====

    /// Overrides stored under one scope. Malformed values are logged and ignored.
    pub fn load_overrides(&self, scope: &ConfigScope) -> Result<ConstraintOverrides, Box<dyn Error>> {
        Ok(ConstraintOverrides {
            min_costume_change_buffer: self.get_minutes(scope, config_keys::MIN_COSTUME_CHANGE_BUFFER)?,
            session_buffer: self.get_minutes(scope, config_keys::SESSION_BUFFER)?,
            max_entries_per_session: self.get_minutes(scope, config_keys::MAX_ENTRIES_PER_SESSION)?,
            prefer_group_by_studio: self.get_flag(scope, config_keys::PREFER_GROUP_BY_STUDIO)?,
            prefer_group_by_category: self.get_flag(scope, config_keys::PREFER_GROUP_BY_CATEGORY)?,
        })
    }

    /// Effective constraints for one scheduling call.
    pub fn load_constraints(
        &self,
        competition_id: &str,
        per_call: &ConstraintOverrides,
    ) -> Result<SchedulingConstraints, Box<dyn Error>> {
        let global = self.load_overrides(&ConfigScope::Global)?;
        let competition = self.load_overrides(&ConfigScope::competition(competition_id))?;

        let layered = global.merged(competition).merged(*per_call);
        let constraints = DEFAULT_CONSTRAINTS.with_overrides(&layered);

        tracing::debug!(competition_id, ?constraints, "constraints resolved");
        Ok(constraints)
    }

    fn get_minutes(&self, scope: &ConfigScope, key: &str) -> Result<Option<u32>, Box<dyn Error>> {
        let Some(raw) = self.get_config_value(scope, key)? else {
            return Ok(None);
        };
        match raw.trim().parse::<u32>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    scope_id = scope.scope_id(),
                    raw_value = %raw,
                    "malformed numeric config value, ignored"
                );
                Ok(None)
            }
        }
    }

    fn get_flag(&self, scope: &ConfigScope, key: &str) -> Result<Option<bool>, Box<dyn Error>> {
        let Some(raw) = self.get_config_value(scope, key)? else {
            return Ok(None);
        };
        match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => {
                tracing::warn!(
                    config_key = key,
                    scope_id = scope.scope_id(),
                    raw_value = %raw,
                    "malformed boolean config value, ignored"
                );
                Ok(None)
            }
        }
    }
}

// ==========================================
// Config keys
// ==========================================
pub mod config_keys {
    // costume change / buffers (minutes)
    pub const MIN_COSTUME_CHANGE_BUFFER: &str = "min_costume_change_buffer";
    pub const SESSION_BUFFER: &str = "session_buffer";

    // capacity
    pub const MAX_ENTRIES_PER_SESSION: &str = "max_entries_per_session";

    // grouping
    pub const PREFER_GROUP_BY_STUDIO: &str = "prefer_group_by_studio";
    pub const PREFER_GROUP_BY_CATEGORY: &str = "prefer_group_by_category";
}
