//! Cycle guard for the unit hierarchy.
//!
//! Linking `parent -> child` is only safe if `parent` is not already reachable
//! from `child`. The guard answers that with an iterative depth-first search
//! that visits every id at most once, so it terminates in O(units + edges)
//! even when handed a scene that is already cyclic.
//!
//! Edges are read from every shape's `children`, named or not. A unit whose
//! name is cleared keeps its links, and renaming it later must not be able to
//! close a loop, so the guard keeps the whole graph acyclic rather than only
//! the part currently visible as units.

#[cfg(test)]
#[path = "cycle_test.rs"]
mod cycle_test;

use std::collections::{HashMap, HashSet};

use crate::scene::{Shape, ShapeId};

/// Adjacency view of the `children` relation, borrowed from a scene snapshot.
pub struct CycleGuard<'a> {
    edges: HashMap<&'a str, &'a [ShapeId]>,
}

impl<'a> CycleGuard<'a> {
    #[must_use]
    pub fn new(shapes: &'a [Shape]) -> Self {
        let edges = shapes
            .iter()
            .filter(|shape| !shape.metadata.children.is_empty())
            .map(|shape| (shape.id.as_str(), shape.metadata.children.as_slice()))
            .collect();
        Self { edges }
    }

    /// True when `to` can be reached from `from` by following `children`.
    /// Every id reaches itself.
    #[must_use]
    pub fn reaches(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = vec![from];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(children) = self.edges.get(id) else {
                continue;
            };
            for child in *children {
                if child == to {
                    return true;
                }
                if !visited.contains(child.as_str()) {
                    stack.push(child.as_str());
                }
            }
        }
        false
    }

    /// True when adding `candidate_parent -> candidate_child` would close a cycle,
    /// including the self-loop `parent == child`.
    #[must_use]
    pub fn would_create_cycle(&self, candidate_parent: &str, candidate_child: &str) -> bool {
        self.reaches(candidate_child, candidate_parent)
    }
}

/// One-shot form of [`CycleGuard::would_create_cycle`] over a scene snapshot.
#[must_use]
pub fn would_create_cycle(shapes: &[Shape], candidate_parent: &str, candidate_child: &str) -> bool {
    CycleGuard::new(shapes).would_create_cycle(candidate_parent, candidate_child)
}
