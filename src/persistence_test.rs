#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::scene::{Shape, ShapeKind};
use crate::storage::MemoryStorage;

const PLAN: &str = "etage 1";

fn adapter() -> PersistenceAdapter<MemoryStorage> {
    PersistenceAdapter::new(MemoryStorage::new(), PersistenceConfig::default())
}

fn window() -> Duration {
    PersistenceConfig::default().debounce
}

fn plan_with(ids: &[&str]) -> PersistedPlan {
    PersistedPlan {
        elements: ids.iter().map(|id| Shape::new(*id, ShapeKind::Rectangle)).collect(),
        ..PersistedPlan::default()
    }
}

fn dimmed_plan() -> PersistedPlan {
    let mut plan = plan_with(&["a", "b"]);
    plan.elements[1].opacity = 15.0;
    plan
}

// =============================================================
// load / save
// =============================================================

#[test]
fn load_absent_plan_is_none() {
    assert!(adapter().load(PLAN).is_none());
}

#[test]
fn save_then_load() {
    let mut adapter = adapter();
    adapter.save(PLAN, &plan_with(&["a"])).unwrap();
    let loaded = adapter.load(PLAN).unwrap();
    assert_eq!(loaded.elements.len(), 1);
    assert_eq!(loaded.elements[0].id, "a");
}

#[test]
fn save_uses_namespaced_key() {
    let mut adapter = PersistenceAdapter::new(
        MemoryStorage::new(),
        PersistenceConfig { namespace: "acme".into(), ..PersistenceConfig::default() },
    );
    adapter.save("7", &PersistedPlan::default()).unwrap();
    assert!(adapter.storage().get_item("acme-floor-7").unwrap().is_some());
}

#[test]
fn save_clears_collaborators() {
    let mut adapter = adapter();
    let mut plan = plan_with(&["a"]);
    plan.app_state.collaborators = json!([{ "id": "peer" }]);
    adapter.save(PLAN, &plan).unwrap();
    assert_eq!(adapter.load(PLAN).unwrap().app_state.collaborators, json!([]));
}

#[test]
fn plans_are_isolated_by_id() {
    let mut adapter = adapter();
    adapter.save("1", &plan_with(&["a"])).unwrap();
    adapter.save("2", &plan_with(&["b", "c"])).unwrap();
    assert_eq!(adapter.load("1").unwrap().elements.len(), 1);
    assert_eq!(adapter.load("2").unwrap().elements.len(), 2);
}

#[test]
fn unreadable_record_loads_as_none() {
    let mut storage = MemoryStorage::new();
    storage.set_item(&plan_key("reserveo", PLAN), "{\"elements\": 12}").unwrap();
    let adapter = PersistenceAdapter::new(storage, PersistenceConfig::default());
    assert!(adapter.load(PLAN).is_none());
}

#[test]
fn one_bad_unit_field_does_not_discard_the_plan() {
    let record = json!({
        "elements": [
            { "id": "a", "type": "rectangle", "customData": { "name": "Desk", "priceUnit": "j" } },
            { "id": "b", "type": "ellipse", "customData": { "name": "Booth", "priceUnit": "day", "workingDays": [1, 8] } },
            { "id": "c", "type": "diamond", "customData": null }
        ],
        "appState": {},
        "files": {}
    });
    let mut storage = MemoryStorage::new();
    storage.set_item(&plan_key("reserveo", PLAN), &record.to_string()).unwrap();
    let adapter = PersistenceAdapter::new(storage, PersistenceConfig::default());

    let plan = adapter.load(PLAN).unwrap();

    let names: Vec<_> = plan.elements.iter().filter_map(|s| s.metadata.unit_name()).collect();
    assert_eq!(names, vec!["Desk", "Booth"]);
    assert_eq!(plan.elements[0].metadata.price_unit, None);
    assert_eq!(plan.elements[1].metadata.price_unit, Some(crate::unit::PriceUnit::Day));
    assert_eq!(plan.elements[1].metadata.working_days.len(), 1);
    assert!(plan.elements[2].metadata.is_empty());
}

// =============================================================
// debounce
// =============================================================

#[test]
fn nothing_pending_is_idle() {
    let mut adapter = adapter();
    assert_eq!(adapter.flush_due(Instant::now()), SaveOutcome::Idle);
    assert!(adapter.deadline().is_none());
}

#[test]
fn burst_within_window_writes_once() {
    let mut adapter = adapter();
    let start = Instant::now();
    let step = Duration::from_millis(100);

    for i in 0..10u32 {
        let now = start + step * i;
        adapter.schedule(PLAN, plan_with(&["a"]), now);
        assert_eq!(adapter.flush_due(now), SaveOutcome::NotDue);
    }

    let last = start + step * 9;
    assert_eq!(adapter.deadline(), Some(last + window()));
    assert_eq!(adapter.flush_due(last + window()), SaveOutcome::Written);
    assert_eq!(adapter.flush_due(last + window() * 2), SaveOutcome::Idle);
    assert_eq!(adapter.storage().writes(), 1);
}

#[test]
fn spaced_changes_write_each_time() {
    let mut adapter = adapter();
    let mut now = Instant::now();
    for _ in 0..4 {
        adapter.schedule(PLAN, plan_with(&["a"]), now);
        now += window() + Duration::from_millis(50);
        assert_eq!(adapter.flush_due(now), SaveOutcome::Written);
    }
    assert_eq!(adapter.storage().writes(), 4);
}

#[test]
fn latest_snapshot_wins() {
    let mut adapter = adapter();
    let now = Instant::now();
    adapter.schedule(PLAN, plan_with(&["a"]), now);
    adapter.schedule(PLAN, plan_with(&["a", "b", "c"]), now);
    adapter.flush_due(now + window());
    assert_eq!(adapter.load(PLAN).unwrap().elements.len(), 3);
}

#[test]
fn deadline_boundary_is_inclusive() {
    let mut adapter = adapter();
    let now = Instant::now();
    adapter.schedule(PLAN, plan_with(&["a"]), now);
    assert_eq!(adapter.flush_due(now + window() - Duration::from_millis(1)), SaveOutcome::NotDue);
    assert_eq!(adapter.flush_due(now + window()), SaveOutcome::Written);
}

#[test]
fn cancel_pending_drops_save() {
    let mut adapter = adapter();
    let now = Instant::now();
    adapter.schedule(PLAN, plan_with(&["a"]), now);
    assert!(adapter.cancel_pending());
    assert!(!adapter.cancel_pending());
    assert_eq!(adapter.flush_due(now + window()), SaveOutcome::Idle);
    assert_eq!(adapter.storage().writes(), 0);
}

// =============================================================
// transient snapshots
// =============================================================

#[test]
fn transient_snapshot_is_skipped() {
    let mut adapter = adapter();
    let now = Instant::now();
    adapter.schedule_during_effect(PLAN, dimmed_plan(), now);
    assert_eq!(adapter.flush_due(now + window()), SaveOutcome::Skipped);
    assert!(!adapter.has_pending());
    assert_eq!(adapter.storage().writes(), 0);
}

#[test]
fn styled_low_opacity_outside_effect_is_written() {
    let mut adapter = adapter();
    let now = Instant::now();
    adapter.schedule(PLAN, dimmed_plan(), now);
    assert_eq!(adapter.flush_due(now + window()), SaveOutcome::Written);
    assert_eq!(adapter.load(PLAN).unwrap().elements[1].opacity, 15.0);
}

#[test]
fn effect_snapshot_at_full_opacity_is_written() {
    let mut adapter = adapter();
    let now = Instant::now();
    adapter.schedule_during_effect(PLAN, plan_with(&["a"]), now);
    assert_eq!(adapter.flush_due(now + window()), SaveOutcome::Written);
}

#[test]
fn settled_change_after_skip_is_written() {
    let mut adapter = adapter();
    let now = Instant::now();
    adapter.schedule_during_effect(PLAN, dimmed_plan(), now);
    adapter.flush_due(now + window());

    let later = now + window() * 2;
    adapter.schedule(PLAN, plan_with(&["a", "b"]), later);
    assert_eq!(adapter.flush_due(later + window()), SaveOutcome::Written);
    assert_eq!(adapter.storage().writes(), 1);
}

#[test]
fn dim_then_restore_inside_window_writes_settled_state() {
    let mut adapter = adapter();
    let now = Instant::now();
    adapter.schedule_during_effect(PLAN, dimmed_plan(), now);
    adapter.schedule(PLAN, plan_with(&["a", "b"]), now + Duration::from_millis(200));
    let due = now + Duration::from_millis(200) + window();
    assert_eq!(adapter.flush_due(due), SaveOutcome::Written);
    assert!(adapter.load(PLAN).unwrap().elements.iter().all(|s| s.opacity >= 100.0));
}

// =============================================================
// settle (async driver)
// =============================================================

#[tokio::test(start_paused = true)]
async fn settle_waits_for_quiet_period() {
    let mut adapter = adapter();
    let start = Instant::now();
    adapter.schedule(PLAN, plan_with(&["a"]), start);

    assert_eq!(adapter.settle().await, SaveOutcome::Written);
    assert!(Instant::now() >= start + window());
    assert_eq!(adapter.storage().writes(), 1);
}

#[tokio::test(start_paused = true)]
async fn settle_without_pending_returns_immediately() {
    let mut adapter = adapter();
    let start = Instant::now();
    assert_eq!(adapter.settle().await, SaveOutcome::Idle);
    assert_eq!(Instant::now(), start);
}
