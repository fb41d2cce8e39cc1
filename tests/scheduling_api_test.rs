// ==========================================
// SchedulingApi integration tests
// ==========================================
// Scope:
// 1. auto-schedule: placement, capacity, costume shift, grouping config
// 2. manual assignment with conflict reporting
// 3. clearing / unscheduling
// 4. schedule lock and optimistic locking
// ==========================================

mod helpers;

use competition_scheduler::api::{ApiError, ManualAssignRequest};
use competition_scheduler::config::{config_keys, ConfigScope};
use competition_scheduler::domain::{
    ConflictKind, ConstraintOverrides, ScheduleActionType, ScheduleState,
};
use competition_scheduler::engine::SkipReason;
use helpers::api_test_helper::*;
use helpers::test_data_builder::{at, EntryBuilder, SessionBuilder};

fn draft_env() -> ApiTestEnv {
    let env = ApiTestEnv::new().expect("failed to create test env");
    env.add_competition("C1", ScheduleState::Draft);
    env
}

// ==========================================
// Auto-schedule
// ==========================================

#[test]
fn test_auto_schedule_places_entries_back_to_back() {
    let env = draft_env();
    env.add_session(SessionBuilder::new("S1", "C1"));
    env.add_entry(EntryBuilder::new("E1", "C1").dancer("D1"));
    env.add_entry(EntryBuilder::new("E2", "C1").dancer("D2"));
    env.add_entry(EntryBuilder::new("E3", "C1").dancer("D3"));

    let resp = env
        .scheduling_api
        .auto_schedule("C1", "S1", &ids(&["E1", "E2", "E3"]), &tight_overrides(), ACTOR)
        .expect("auto schedule failed");

    assert_eq!(resp.result.scheduled_count(), 3);
    assert_eq!(resp.result.skipped_count(), 0);
    assert!(resp.late_numbers.is_empty());
    assert_eq!(resp.schedule_revision, 1);

    // stored slots
    let expected = [("E1", at(9, 0), 1), ("E2", at(9, 4), 2), ("E3", at(9, 8), 3)];
    for (id, time, order) in expected {
        let entry = env.entry("C1", id);
        assert_eq!(entry.session_id.as_deref(), Some("S1"), "{}", id);
        assert_eq!(entry.performance_time, Some(time), "{}", id);
        assert_eq!(entry.running_order, Some(order), "{}", id);
    }
    assert_eq!(env.revision("C1"), 1);

    // audit row
    let logs = env.action_log_repo.find_by_competition("C1", 10).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action_type, ScheduleActionType::AutoSchedule);
    assert_eq!(logs[0].session_id.as_deref(), Some("S1"));
    assert_eq!(logs[0].actor, ACTOR);

    // the placement is clean under the constraints it was computed with
    let report = env
        .scheduling_api
        .validate_schedule("C1", &tight_overrides())
        .unwrap();
    assert!(report.validation.is_valid);
    assert_eq!(report.stats.scheduled_entries, 3);
    assert_eq!(report.stats.unscheduled_entries, 0);
}

#[test]
fn test_auto_schedule_capacity_overflow() {
    let env = draft_env();
    env.add_session(SessionBuilder::new("S1", "C1").max_entries(2));
    for id in ["E1", "E2", "E3"] {
        env.add_entry(EntryBuilder::new(id, "C1"));
    }

    let resp = env
        .scheduling_api
        .auto_schedule("C1", "S1", &ids(&["E1", "E2", "E3"]), &tight_overrides(), ACTOR)
        .unwrap();

    assert_eq!(resp.result.scheduled_count(), 2);
    assert_eq!(resp.result.skipped.len(), 1);
    assert_eq!(resp.result.skipped[0].entry_id, "E3");
    assert_eq!(
        resp.result.skipped[0].reason,
        SkipReason::CapacityReached { max_entries: 2 }
    );

    let unscheduled = env.scheduling_api.get_unscheduled_entries("C1").unwrap();
    assert_eq!(unscheduled.len(), 1);
    assert_eq!(unscheduled[0].id, "E3");
}

#[test]
fn test_auto_schedule_shifts_for_costume_change() {
    let env = draft_env();
    env.add_session(SessionBuilder::new("S1", "C1"));
    env.add_entry(EntryBuilder::new("E1", "C1").dancer("D1"));
    env.add_entry(EntryBuilder::new("E2", "C1").dancer("D1"));
    env.add_entry(EntryBuilder::new("E3", "C1").dancer("D2"));

    env.scheduling_api
        .auto_schedule("C1", "S1", &ids(&["E1", "E2", "E3"]), &tight_overrides(), ACTOR)
        .unwrap();

    assert_eq!(env.entry("C1", "E1").performance_time, Some(at(9, 0)));
    // 09:03 end + 10 min costume change
    assert_eq!(env.entry("C1", "E2").performance_time, Some(at(9, 13)));
    assert_eq!(env.entry("C1", "E3").performance_time, Some(at(9, 17)));

    let conflicts = env
        .scheduling_api
        .get_conflicts("C1", &tight_overrides())
        .unwrap();
    assert!(conflicts.iter().all(|c| c.kind != ConflictKind::CostumeChange));
}

#[test]
fn test_auto_schedule_nothing_placed_keeps_revision() {
    let env = draft_env();
    env.add_session(SessionBuilder::new("S1", "C1").window(at(9, 0), Some(at(9, 2))));
    env.add_entry(EntryBuilder::new("E1", "C1"));

    let resp = env
        .scheduling_api
        .auto_schedule("C1", "S1", &ids(&["E1"]), &tight_overrides(), ACTOR)
        .unwrap();

    assert_eq!(resp.result.scheduled_count(), 0);
    assert!(matches!(
        resp.result.skipped[0].reason,
        SkipReason::WindowExceeded { .. }
    ));
    assert_eq!(resp.schedule_revision, 0);
    assert!(env.action_log_repo.find_by_competition("C1", 10).unwrap().is_empty());
}

#[test]
fn test_auto_schedule_rejects_bad_input() {
    let env = draft_env();
    env.add_session(SessionBuilder::new("S1", "C1"));
    env.add_entry(EntryBuilder::new("E1", "C1"));

    let empty = env
        .scheduling_api
        .auto_schedule("C1", "S1", &[], &tight_overrides(), ACTOR);
    assert!(matches!(empty, Err(ApiError::InvalidInput(_))));

    let unknown_session = env
        .scheduling_api
        .auto_schedule("C1", "S9", &ids(&["E1"]), &tight_overrides(), ACTOR);
    assert!(matches!(unknown_session, Err(ApiError::NotFound(_))));

    let unknown_entry = env
        .scheduling_api
        .auto_schedule("C1", "S1", &ids(&["E9"]), &tight_overrides(), ACTOR);
    assert!(matches!(unknown_entry, Err(ApiError::NotFound(_))));

    let unknown_competition = env
        .scheduling_api
        .auto_schedule("C9", "S1", &ids(&["E1"]), &tight_overrides(), ACTOR);
    assert!(matches!(unknown_competition, Err(ApiError::NotFound(_))));
}

#[test]
fn test_stored_config_layers_under_call_overrides() {
    let env = draft_env();
    env.add_session(SessionBuilder::new("S1", "C1"));
    for id in ["E1", "E2", "E3"] {
        env.add_entry(EntryBuilder::new(id, "C1"));
    }
    env.config_manager
        .set_config_value(
            &ConfigScope::competition("C1"),
            config_keys::MAX_ENTRIES_PER_SESSION,
            "1",
        )
        .unwrap();

    let first = env
        .scheduling_api
        .auto_schedule("C1", "S1", &ids(&["E1", "E2"]), &tight_overrides(), ACTOR)
        .unwrap();
    assert_eq!(first.result.scheduled_count(), 1);
    assert_eq!(
        first.result.skipped[0].reason,
        SkipReason::CapacityReached { max_entries: 1 }
    );

    let raised = ConstraintOverrides {
        max_entries_per_session: Some(3),
        ..tight_overrides()
    };
    let second = env
        .scheduling_api
        .auto_schedule("C1", "S1", &ids(&["E2", "E3"]), &raised, ACTOR)
        .unwrap();
    assert_eq!(second.result.scheduled_count(), 2);
    assert_eq!(env.entry("C1", "E2").running_order, Some(2));
    assert_eq!(env.entry("C1", "E2").performance_time, Some(at(9, 4)));
    assert_eq!(env.entry("C1", "E3").running_order, Some(3));

    let stats = env
        .scheduling_api
        .get_session_stats("C1", "S1", &raised)
        .unwrap();
    assert_eq!(stats.entry_count, 3);
}

// ==========================================
// Manual assignment
// ==========================================

fn assign(entry_id: &str, time: chrono::NaiveDateTime, order: u32, revision: Option<i64>) -> ManualAssignRequest {
    ManualAssignRequest {
        entry_id: entry_id.to_string(),
        session_id: "S1".to_string(),
        performance_time: time,
        running_order: order,
        expected_revision: revision,
    }
}

#[test]
fn test_manual_assign_reports_conflicts() {
    let env = draft_env();
    env.add_session(SessionBuilder::new("S1", "C1"));
    env.add_entry(EntryBuilder::new("E1", "C1").dancer("D1"));
    env.add_entry(EntryBuilder::new("E2", "C1").dancer("D1"));

    let first = env
        .scheduling_api
        .assign_entry("C1", &assign("E1", at(9, 0), 1, None), ACTOR)
        .unwrap();
    assert!(first.conflicts.is_empty());
    assert_eq!(first.schedule_revision, 1);

    // default constraints: 20 min costume change, only 2 min available
    let second = env
        .scheduling_api
        .assign_entry("C1", &assign("E2", at(9, 5), 2, None), ACTOR)
        .unwrap();
    assert_eq!(second.schedule_revision, 2);
    assert_eq!(second.entry.running_order, Some(2));
    assert!(second
        .conflicts
        .iter()
        .any(|c| c.kind == ConflictKind::CostumeChange && c.is_error()));
    assert!(second.conflicts.iter().all(|c| c.involves("E2")));

    // conflicts are reported, not rejected
    assert_eq!(env.entry("C1", "E2").performance_time, Some(at(9, 5)));
}

#[test]
fn test_manual_assign_rejects_zero_running_order() {
    let env = draft_env();
    env.add_session(SessionBuilder::new("S1", "C1"));
    env.add_entry(EntryBuilder::new("E1", "C1"));

    let result = env
        .scheduling_api
        .assign_entry("C1", &assign("E1", at(9, 0), 0, None), ACTOR);
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

#[test]
fn test_stale_revision_is_rejected() {
    let env = draft_env();
    env.add_session(SessionBuilder::new("S1", "C1"));
    env.add_entry(EntryBuilder::new("E1", "C1"));
    env.add_entry(EntryBuilder::new("E2", "C1"));

    env.scheduling_api
        .assign_entry("C1", &assign("E1", at(9, 0), 1, Some(0)), ACTOR)
        .unwrap();

    // a second writer still holding revision 0
    let stale = env
        .scheduling_api
        .assign_entry("C1", &assign("E2", at(9, 4), 2, Some(0)), ACTOR);
    match stale {
        Err(ApiError::OptimisticLockFailure(msg)) => {
            assert!(msg.contains("expected revision=0"));
            assert!(msg.contains("actual revision=1"));
        }
        other => panic!("expected optimistic lock failure, got {:?}", other),
    }

    assert!(env.entry("C1", "E2").session_id.is_none());
    assert_eq!(env.revision("C1"), 1);
}

// ==========================================
// Clearing
// ==========================================

#[test]
fn test_clear_session_and_unschedule() {
    let env = draft_env();
    env.add_session(SessionBuilder::new("S1", "C1"));
    env.add_entry(EntryBuilder::new("E1", "C1").scheduled("S1", at(9, 0), 1));
    env.add_entry(EntryBuilder::new("E2", "C1").scheduled("S1", at(9, 4), 2));
    env.add_entry(EntryBuilder::new("E3", "C1"));

    // unscheduled entries are a no-op
    let noop = env
        .scheduling_api
        .unschedule_entries("C1", &ids(&["E3"]), ACTOR, None)
        .unwrap();
    assert!(noop.cleared_entry_ids.is_empty());
    assert_eq!(noop.schedule_revision, 0);

    let one = env
        .scheduling_api
        .unschedule_entries("C1", &ids(&["E2", "E2"]), ACTOR, None)
        .unwrap();
    assert_eq!(one.cleared_entry_ids, ids(&["E2"]));
    assert_eq!(one.schedule_revision, 1);
    let e2 = env.entry("C1", "E2");
    assert!(e2.session_id.is_none());
    assert!(e2.performance_time.is_none());
    assert!(e2.running_order.is_none());

    let all = env
        .scheduling_api
        .clear_session("C1", "S1", ACTOR, Some(1))
        .unwrap();
    assert_eq!(all.cleared_entry_ids, ids(&["E1"]));
    assert_eq!(all.schedule_revision, 2);
    assert_eq!(env.scheduling_api.get_unscheduled_entries("C1").unwrap().len(), 3);

    let logs = env.action_log_repo.find_by_competition("C1", 10).unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs
        .iter()
        .all(|l| l.action_type == ScheduleActionType::ClearSchedule));
}

// ==========================================
// Schedule lock
// ==========================================

#[test]
fn test_published_schedule_rejects_mutations() {
    let env = ApiTestEnv::new().unwrap();
    env.add_competition("C1", ScheduleState::Published);
    env.add_session(SessionBuilder::new("S1", "C1"));
    env.add_entry(EntryBuilder::new("E1", "C1").scheduled("S1", at(9, 0), 1).numbered(100, None));
    env.add_entry(EntryBuilder::new("E2", "C1"));

    let auto = env
        .scheduling_api
        .auto_schedule("C1", "S1", &ids(&["E2"]), &tight_overrides(), ACTOR);
    assert!(matches!(
        auto,
        Err(ApiError::ScheduleLocked { ref competition_id }) if competition_id == "C1"
    ));

    let manual = env
        .scheduling_api
        .assign_entry("C1", &assign("E2", at(9, 30), 2, None), ACTOR);
    assert!(matches!(manual, Err(ApiError::ScheduleLocked { .. })));

    let clear = env.scheduling_api.clear_session("C1", "S1", ACTOR, None);
    assert!(matches!(clear, Err(ApiError::ScheduleLocked { .. })));

    // nothing changed
    assert!(env.entry("C1", "E2").session_id.is_none());
    assert_eq!(env.entry("C1", "E1").performance_time, Some(at(9, 0)));
    assert_eq!(env.revision("C1"), 0);
    assert!(env.action_log_repo.find_by_competition("C1", 10).unwrap().is_empty());

    // reads still work
    let report = env
        .scheduling_api
        .validate_schedule("C1", &tight_overrides())
        .unwrap();
    assert_eq!(report.schedule_state, "PUBLISHED");
}
