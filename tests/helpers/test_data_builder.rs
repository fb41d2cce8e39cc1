// ==========================================
// Test data builders for integration tests
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use competition_scheduler::domain::records::{EntryRecord, ParticipantRecord, SessionRecord};
use competition_scheduler::domain::{Competition, ScheduleState};

/// Competition day used by every fixture.
pub fn competition_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    competition_day().and_hms_opt(hour, minute, 0).unwrap()
}

pub fn competition(competition_id: &str, state: ScheduleState) -> Competition {
    Competition {
        competition_id: competition_id.to_string(),
        name: format!("Spring Regional {}", competition_id),
        schedule_state: state,
        schedule_revision: 0,
    }
}

// ==========================================
// SessionRecord builder
// ==========================================

pub struct SessionBuilder {
    record: SessionRecord,
}

impl SessionBuilder {
    /// 09:00 - 10:00 on the competition day, no entry cap.
    pub fn new(session_id: &str, competition_id: &str) -> Self {
        Self {
            record: SessionRecord {
                session_id: session_id.to_string(),
                competition_id: competition_id.to_string(),
                session_number: 1,
                session_name: Some(format!("Session {}", session_id)),
                session_date: competition_day(),
                start_time: at(9, 0),
                end_time: Some(at(10, 0)),
                max_entries: None,
            },
        }
    }

    pub fn number(mut self, session_number: i64) -> Self {
        self.record.session_number = session_number;
        self
    }

    pub fn window(mut self, start: NaiveDateTime, end: Option<NaiveDateTime>) -> Self {
        self.record.start_time = start;
        self.record.end_time = end;
        self
    }

    pub fn max_entries(mut self, max: i64) -> Self {
        self.record.max_entries = Some(max);
        self
    }

    pub fn build(self) -> SessionRecord {
        self.record
    }
}

// ==========================================
// EntryRecord builder
// ==========================================

pub struct EntryBuilder {
    record: EntryRecord,
    dancers: Vec<String>,
}

impl EntryBuilder {
    /// Three-minute jazz solo from studio A, no warm-up.
    pub fn new(entry_id: &str, competition_id: &str) -> Self {
        Self {
            record: EntryRecord {
                entry_id: entry_id.to_string(),
                competition_id: competition_id.to_string(),
                title: format!("Routine {}", entry_id),
                studio_id: "A".to_string(),
                studio_name: "Studio A".to_string(),
                category_id: "JAZZ".to_string(),
                category_name: "Jazz".to_string(),
                age_group_id: "TEEN".to_string(),
                age_group_name: "Teen".to_string(),
                entry_size_category_id: "SOLO".to_string(),
                duration_minutes: Some(3),
                warm_up_minutes: Some(0),
                ..Default::default()
            },
            dancers: Vec::new(),
        }
    }

    pub fn studio(mut self, studio_id: &str) -> Self {
        self.record.studio_id = studio_id.to_string();
        self.record.studio_name = format!("Studio {}", studio_id);
        self
    }

    pub fn category(mut self, category_id: &str) -> Self {
        self.record.category_id = category_id.to_string();
        self.record.category_name = category_id.to_string();
        self
    }

    pub fn minutes(mut self, duration: i64, warm_up: i64) -> Self {
        self.record.duration_minutes = Some(duration);
        self.record.warm_up_minutes = Some(warm_up);
        self
    }

    pub fn dancer(mut self, dancer_id: &str) -> Self {
        self.dancers.push(dancer_id.to_string());
        self
    }

    pub fn scheduled(mut self, session_id: &str, time: NaiveDateTime, running_order: i64) -> Self {
        self.record.session_id = Some(session_id.to_string());
        self.record.performance_time = Some(time);
        self.record.running_order = Some(running_order);
        self
    }

    pub fn numbered(mut self, number: i64, suffix: Option<&str>) -> Self {
        self.record.entry_number = Some(number);
        self.record.entry_suffix = suffix.map(|s| s.to_string());
        self
    }

    pub fn build(self) -> (EntryRecord, Vec<ParticipantRecord>) {
        let participants = self
            .dancers
            .iter()
            .map(|d| ParticipantRecord {
                entry_id: self.record.entry_id.clone(),
                dancer_id: d.clone(),
                dancer_name: format!("Dancer {}", d),
                dancer_age: Some(14),
            })
            .collect();
        (self.record, participants)
    }
}
