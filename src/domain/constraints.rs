// ==========================================
// Competition Scheduler - Scheduling Constraints
// ==========================================
// Configuration shared by the conflict detector and auto-scheduler.
// Layering: DEFAULT_CONSTRAINTS -> global config -> competition
// config -> per-call overrides, merged field by field.
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConstraints {
    /// Minimum minutes between two performances sharing a dancer.
    /// The later entry's warm-up time is added on top. Default: 20.
    pub min_costume_change_buffer: u32,

    /// Minimum idle minutes between any two consecutive entries of
    /// a session, regardless of shared dancers. Default: 10.
    pub session_buffer: u32,

    /// Entry cap for sessions without their own `max_entries`. Default: 50.
    pub max_entries_per_session: u32,

    /// Cluster entries of the same studio. Takes precedence over
    /// category grouping when both are set. Default: false.
    pub prefer_group_by_studio: bool,

    /// Cluster entries of the same category. Default: true.
    pub prefer_group_by_category: bool,
}

pub const DEFAULT_CONSTRAINTS: SchedulingConstraints = SchedulingConstraints {
    min_costume_change_buffer: 20,
    session_buffer: 10,
    max_entries_per_session: 50,
    prefer_group_by_studio: false,
    prefer_group_by_category: true,
};

impl Default for SchedulingConstraints {
    fn default() -> Self {
        DEFAULT_CONSTRAINTS
    }
}

// ==========================================
// ConstraintOverrides - partial constraints
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintOverrides {
    #[serde(default)]
    pub min_costume_change_buffer: Option<u32>,
    #[serde(default)]
    pub session_buffer: Option<u32>,
    #[serde(default)]
    pub max_entries_per_session: Option<u32>,
    #[serde(default)]
    pub prefer_group_by_studio: Option<bool>,
    #[serde(default)]
    pub prefer_group_by_category: Option<bool>,
}

impl ConstraintOverrides {
    pub fn is_empty(&self) -> bool {
        *self == ConstraintOverrides::default()
    }

    /// Layer `other` on top of `self`; set fields in `other` win.
    pub fn merged(self, other: ConstraintOverrides) -> ConstraintOverrides {
        ConstraintOverrides {
            min_costume_change_buffer: other
                .min_costume_change_buffer
                .or(self.min_costume_change_buffer),
            session_buffer: other.session_buffer.or(self.session_buffer),
            max_entries_per_session: other
                .max_entries_per_session
                .or(self.max_entries_per_session),
            prefer_group_by_studio: other.prefer_group_by_studio.or(self.prefer_group_by_studio),
            prefer_group_by_category: other
                .prefer_group_by_category
                .or(self.prefer_group_by_category),
        }
    }
}

impl SchedulingConstraints {
    pub fn with_overrides(self, overrides: &ConstraintOverrides) -> SchedulingConstraints {
        SchedulingConstraints {
            min_costume_change_buffer: overrides
                .min_costume_change_buffer
                .unwrap_or(self.min_costume_change_buffer),
            session_buffer: overrides.session_buffer.unwrap_or(self.session_buffer),
            max_entries_per_session: overrides
                .max_entries_per_session
                .unwrap_or(self.max_entries_per_session),
            prefer_group_by_studio: overrides
                .prefer_group_by_studio
                .unwrap_or(self.prefer_group_by_studio),
            prefer_group_by_category: overrides
                .prefer_group_by_category
                .unwrap_or(self.prefer_group_by_category),
        }
    }
}
