// ==========================================
// Competition Scheduler - Conflict
// ==========================================
// Output of the conflict detector. Every conflict carries an
// explicit, itemized explanation (which entries, which dancers, why).
// ==========================================

use crate::domain::types::{ConflictKind, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub severity: Severity,
    pub entry_ids: Vec<String>,
    pub dancer_ids: Vec<String>,
    pub session_id: Option<String>,
    pub message: String,
}

impl Conflict {
    pub fn error(kind: ConflictKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            entry_ids: Vec::new(),
            dancer_ids: Vec::new(),
            session_id: None,
            message: message.into(),
        }
    }

    pub fn warning(kind: ConflictKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, message)
        }
    }

    pub fn with_entries<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dancers<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dancer_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn in_session(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn involves(&self, entry_id: &str) -> bool {
        self.entry_ids.iter().any(|id| id == entry_id)
    }
}
