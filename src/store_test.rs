#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::canvas::MemoryCanvas;
use crate::scene::ShapeKind;

fn store_with(ids: &[&str]) -> ElementStore<MemoryCanvas> {
    let shapes = ids.iter().map(|id| Shape::new(*id, ShapeKind::Rectangle)).collect();
    ElementStore::with_canvas(MemoryCanvas::with_elements(shapes))
}

// =============================================================
// Uninitialized store
// =============================================================

#[test]
fn uninitialized_reads_are_empty() {
    let store: ElementStore<MemoryCanvas> = ElementStore::new();
    assert!(!store.is_ready());
    assert!(store.get_all().is_empty());
    assert!(store.find("a").is_none());
    assert!(store.view().is_none());
    assert!(store.snapshot().is_none());
}

#[test]
fn uninitialized_writes_are_noops() {
    let mut store: ElementStore<MemoryCanvas> = ElementStore::new();
    let mut calls = 0;
    let committed = store.replace_all(|shape| {
        calls += 1;
        shape
    });
    assert!(!committed);
    assert_eq!(calls, 0);
    assert_eq!(store.revision(), 0);
    assert!(!store.scroll_to_content(
        ScrollTarget::AllContent,
        ScrollOptions { padding: 0.0, animate: false, duration_ms: 0 }
    ));
    store.stop_animation();
}

// =============================================================
// replace_all
// =============================================================

#[test]
fn replace_all_commits_once() {
    let mut store = store_with(&["a", "b", "c"]);
    let committed = store.replace_all(|mut shape| {
        shape.opacity = 50.0;
        shape
    });
    assert!(committed);
    assert_eq!(store.revision(), 1);
    assert!(store.get_all().iter().all(|s| s.opacity == 50.0));
    assert_eq!(store.canvas().map(MemoryCanvas::update_count), Some(1));
}

#[test]
fn replace_all_reads_fresh_scene() {
    let mut store = store_with(&["a"]);
    if let Some(canvas) = store.canvas_mut() {
        canvas.update_scene(SceneUpdate {
            elements: Some(vec![Shape::new("a", ShapeKind::Rectangle), Shape::new("b", ShapeKind::Ellipse)]),
            app_state: None,
        });
    }
    let mut seen = Vec::new();
    store.replace_all(|shape| {
        seen.push(shape.id.clone());
        shape
    });
    assert_eq!(seen, vec!["a".to_owned(), "b".to_owned()]);
}

#[test]
fn replace_all_preserves_order() {
    let mut store = store_with(&["z", "a", "m"]);
    store.replace_all(|shape| shape);
    let ids: Vec<_> = store.get_all().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["z", "a", "m"]);
}

// =============================================================
// attach / detach
// =============================================================

#[test]
fn attach_and_detach() {
    let mut store: ElementStore<MemoryCanvas> = ElementStore::new();
    assert!(store.attach(MemoryCanvas::new()).is_none());
    assert!(store.is_ready());
    assert!(store.attach(MemoryCanvas::new()).is_some());
    assert!(store.detach().is_some());
    assert!(!store.is_ready());
}

#[test]
fn find_returns_live_shape() {
    let store = store_with(&["a", "b"]);
    assert_eq!(store.find("b").map(|s| s.id), Some("b".to_owned()));
    assert!(store.find("zz").is_none());
}

#[test]
fn snapshot_clears_collaborators() {
    let mut store = store_with(&["a"]);
    if let Some(canvas) = store.canvas_mut() {
        let mut view = canvas.app_state();
        view.collaborators = json!([{ "id": "peer" }]);
        canvas.update_scene(SceneUpdate { elements: None, app_state: Some(view) });
    }
    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.elements.len(), 1);
    assert_eq!(snapshot.app_state.collaborators, json!([]));
}
