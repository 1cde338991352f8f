use super::*;
use crate::scene::ShapeKind;

fn unit(id: &str, children: &[&str]) -> Shape {
    let mut shape = Shape::new(id, ShapeKind::Rectangle);
    shape.metadata.name = Some(id.to_uppercase());
    shape.metadata.children = children.iter().map(|c| (*c).to_owned()).collect();
    shape
}

#[test]
fn self_link_is_a_cycle() {
    let shapes = vec![unit("a", &[])];
    assert!(would_create_cycle(&shapes, "a", "a"));
}

#[test]
fn unrelated_units_do_not_cycle() {
    let shapes = vec![unit("a", &[]), unit("b", &[])];
    assert!(!would_create_cycle(&shapes, "a", "b"));
    assert!(!would_create_cycle(&shapes, "b", "a"));
}

#[test]
fn direct_back_edge_is_a_cycle() {
    let shapes = vec![unit("a", &["b"]), unit("b", &[])];
    assert!(would_create_cycle(&shapes, "b", "a"));
    // Re-linking the existing direction is not a cycle.
    assert!(!would_create_cycle(&shapes, "a", "b"));
}

#[test]
fn multi_hop_cycle_detected() {
    let shapes = vec![unit("a", &["b"]), unit("b", &["c"]), unit("c", &["d"]), unit("d", &[])];
    assert!(would_create_cycle(&shapes, "d", "a"));
    assert!(would_create_cycle(&shapes, "c", "a"));
    assert!(!would_create_cycle(&shapes, "a", "d"));
}

#[test]
fn diamond_shaped_graph_is_not_a_cycle() {
    let shapes = vec![unit("a", &["b", "c"]), unit("b", &["d"]), unit("c", &["d"]), unit("d", &[])];
    assert!(!would_create_cycle(&shapes, "b", "c"));
    assert!(would_create_cycle(&shapes, "d", "a"));
}

#[test]
fn terminates_on_already_cyclic_input() {
    // Malformed scene: a <-> b already loop.
    let shapes = vec![unit("a", &["b"]), unit("b", &["a"]), unit("x", &[])];
    assert!(!would_create_cycle(&shapes, "x", "a"));
    assert!(would_create_cycle(&shapes, "a", "b"));
}

#[test]
fn stale_child_ids_are_harmless() {
    let shapes = vec![unit("a", &["ghost"]), unit("b", &[])];
    assert!(!would_create_cycle(&shapes, "b", "a"));
    assert!(!would_create_cycle(&shapes, "ghost", "b"));
}

#[test]
fn unnamed_shapes_still_carry_edges() {
    let mut hidden = unit("b", &["c"]);
    hidden.metadata.name = None;
    let shapes = vec![unit("a", &["b"]), hidden, unit("c", &[])];
    assert!(would_create_cycle(&shapes, "c", "a"));
}

#[test]
fn reaches_is_reflexive_and_directed() {
    let shapes = vec![unit("a", &["b"]), unit("b", &[])];
    let guard = CycleGuard::new(&shapes);
    assert!(guard.reaches("a", "a"));
    assert!(guard.reaches("a", "b"));
    assert!(!guard.reaches("b", "a"));
}

#[test]
fn long_chain_is_handled_iteratively() {
    let ids: Vec<String> = (0..5_000).map(|i| format!("n{i}")).collect();
    let shapes: Vec<Shape> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let next: Vec<&str> = ids.get(i + 1).map(String::as_str).into_iter().collect();
            unit(id, &next)
        })
        .collect();
    assert!(would_create_cycle(&shapes, "n4999", "n0"));
    assert!(!would_create_cycle(&shapes, "n0", "n4999"));
}
