//! Element store: the only component that reads or writes raw shapes.
//!
//! The store wraps the mounted canvas, if any. Before a canvas is attached
//! (initial load, or between plans) every read returns an empty scene and every
//! write is a no-op; callers treat that the same as a plan with no content.
//!
//! Writes go through [`ElementStore::replace_all`], which re-reads the live
//! scene, maps every shape, and commits the result in a single
//! `update_scene` call. A caller never sees half of a replacement applied.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use tracing::debug;

use crate::canvas::{Canvas, SceneUpdate, ScrollOptions, ScrollTarget};
use crate::scene::{PersistedPlan, Shape, ViewState};

pub struct ElementStore<C> {
    canvas: Option<C>,
    revision: u64,
}

impl<C> Default for ElementStore<C> {
    fn default() -> Self {
        Self { canvas: None, revision: 0 }
    }
}

impl<C: Canvas> ElementStore<C> {
    /// A store with no canvas mounted yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_canvas(canvas: C) -> Self {
        Self { canvas: Some(canvas), revision: 0 }
    }

    /// Mount a canvas, returning the one it replaces.
    pub fn attach(&mut self, canvas: C) -> Option<C> {
        self.canvas.replace(canvas)
    }

    /// Unmount the canvas. The store is uninitialized afterwards.
    pub fn detach(&mut self) -> Option<C> {
        self.canvas.take()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.canvas.is_some()
    }

    #[must_use]
    pub fn canvas(&self) -> Option<&C> {
        self.canvas.as_ref()
    }

    pub fn canvas_mut(&mut self) -> Option<&mut C> {
        self.canvas.as_mut()
    }

    /// Number of commits made through this store.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Fresh copy of the live scene. Empty when no canvas is mounted.
    #[must_use]
    pub fn get_all(&self) -> Vec<Shape> {
        self.canvas.as_ref().map_or_else(Vec::new, Canvas::scene_elements)
    }

    /// Look up one shape in the live scene.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<Shape> {
        self.get_all().into_iter().find(|shape| shape.id == id)
    }

    /// Current app state, or `None` when no canvas is mounted.
    #[must_use]
    pub fn view(&self) -> Option<ViewState> {
        self.canvas.as_ref().map(Canvas::app_state)
    }

    /// Apply `transform` to every shape and commit the result atomically.
    ///
    /// Returns `false` without calling `transform` when no canvas is mounted.
    pub fn replace_all<F>(&mut self, transform: F) -> bool
    where
        F: FnMut(Shape) -> Shape,
    {
        let Some(canvas) = self.canvas.as_mut() else {
            debug!("element store not ready; replace skipped");
            return false;
        };
        let elements: Vec<Shape> = canvas.scene_elements().into_iter().map(transform).collect();
        canvas.update_scene(SceneUpdate { elements: Some(elements), app_state: None });
        self.revision += 1;
        true
    }

    /// Forward a camera request to the canvas. Returns `false` when none is mounted.
    pub fn scroll_to_content(&mut self, target: ScrollTarget, options: ScrollOptions) -> bool {
        let Some(canvas) = self.canvas.as_mut() else {
            return false;
        };
        canvas.scroll_to_content(target, options);
        true
    }

    /// Abandon any in-flight camera animation.
    pub fn stop_animation(&mut self) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.stop_animation();
        }
    }

    /// The storable record of the live scene, collaborators cleared.
    #[must_use]
    pub fn snapshot(&self) -> Option<PersistedPlan> {
        let canvas = self.canvas.as_ref()?;
        Some(PersistedPlan::capture(canvas.scene_elements(), &canvas.app_state(), canvas.files()))
    }
}
