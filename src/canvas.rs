//! Whiteboard collaborator seam.
//!
//! The embedded whiteboard owns drawing, hit-testing, undo and camera motion.
//! This layer talks to it only through [`Canvas`], which mirrors the small
//! imperative API the whiteboard exposes to its host: read the scene, replace
//! elements or app state, and scroll the camera to some content.
//!
//! [`MemoryCanvas`] is a headless implementation. It applies every update
//! immediately, settles scroll requests on the final camera instead of
//! animating, and records what it was asked to do so callers can inspect it.

#[cfg(test)]
#[path = "canvas_test.rs"]
mod canvas_test;

use crate::camera::{Bounds, Camera};
use crate::scene::{BinaryFiles, PersistedPlan, Shape, ShapeId, ViewState};

/// Partial scene replacement. Absent parts are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneUpdate {
    pub elements: Option<Vec<Shape>>,
    pub app_state: Option<ViewState>,
}

/// What a scroll request should bring into view.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollTarget {
    /// Fit the listed elements.
    Shapes(Vec<ShapeId>),
    /// Return to a previously captured camera.
    View(Camera),
    /// Fit every element in the scene.
    AllContent,
}

/// Camera motion parameters for a scroll request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollOptions {
    /// Screen-space margin kept around the target.
    pub padding: f64,
    pub animate: bool,
    pub duration_ms: u64,
}

/// The embedded whiteboard, as seen by this layer.
///
/// Every call runs on the UI event loop. Animations are fire-and-forget: the
/// call returns before the camera settles.
pub trait Canvas {
    /// Current live elements, in scene order.
    fn scene_elements(&self) -> Vec<Shape>;

    /// Current app state (camera, viewport, selection).
    fn app_state(&self) -> ViewState;

    /// Current binary asset table.
    fn files(&self) -> BinaryFiles;

    /// Replace elements and/or app state in one commit.
    fn update_scene(&mut self, update: SceneUpdate);

    /// Move the camera toward `target`.
    fn scroll_to_content(&mut self, target: ScrollTarget, options: ScrollOptions);

    /// Abandon any camera animation still in flight.
    fn stop_animation(&mut self) {}
}

/// Headless whiteboard holding its scene in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCanvas {
    elements: Vec<Shape>,
    app_state: ViewState,
    files: BinaryFiles,
    scroll_log: Vec<(ScrollTarget, ScrollOptions)>,
    update_count: usize,
    stopped_animations: usize,
}

impl MemoryCanvas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount with a plan's stored data as initial content.
    #[must_use]
    pub fn from_plan(plan: PersistedPlan) -> Self {
        Self { elements: plan.elements, app_state: plan.app_state, files: plan.files, ..Self::default() }
    }

    /// Mount with the given elements and an otherwise default app state.
    #[must_use]
    pub fn with_elements(elements: Vec<Shape>) -> Self {
        Self { elements, ..Self::default() }
    }

    /// Set the viewport size used to fit scroll targets.
    #[must_use]
    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.app_state.width = width;
        self.app_state.height = height;
        self
    }

    /// Mark `id` as the only selected element, as a click on the canvas would.
    pub fn select(&mut self, id: Option<&str>) {
        self.app_state.selected_element_ids.clear();
        if let Some(id) = id {
            self.app_state.selected_element_ids.insert(id.to_owned(), true);
        }
    }

    /// Every scroll request received, oldest first.
    #[must_use]
    pub fn scroll_log(&self) -> &[(ScrollTarget, ScrollOptions)] {
        &self.scroll_log
    }

    /// Number of `update_scene` commits received.
    #[must_use]
    pub fn update_count(&self) -> usize {
        self.update_count
    }

    /// Number of `stop_animation` calls received.
    #[must_use]
    pub fn stopped_animations(&self) -> usize {
        self.stopped_animations
    }

    fn fit_camera(&self, bounds: Bounds, padding: f64) -> Camera {
        Camera::fit(bounds, self.app_state.width, self.app_state.height, padding)
    }
}

impl Canvas for MemoryCanvas {
    fn scene_elements(&self) -> Vec<Shape> {
        self.elements.clone()
    }

    fn app_state(&self) -> ViewState {
        self.app_state.clone()
    }

    fn files(&self) -> BinaryFiles {
        self.files.clone()
    }

    fn update_scene(&mut self, update: SceneUpdate) {
        if let Some(elements) = update.elements {
            self.elements = elements;
        }
        if let Some(app_state) = update.app_state {
            self.app_state = app_state;
        }
        self.update_count += 1;
    }

    fn scroll_to_content(&mut self, target: ScrollTarget, options: ScrollOptions) {
        let camera = match &target {
            ScrollTarget::View(camera) => Some(*camera),
            ScrollTarget::Shapes(ids) => Bounds::enclosing(
                self.elements
                    .iter()
                    .filter(|shape| ids.contains(&shape.id))
                    .map(Shape::bounds),
            )
            .map(|bounds| self.fit_camera(bounds, options.padding)),
            ScrollTarget::AllContent => {
                Bounds::enclosing(self.elements.iter().map(Shape::bounds))
                    .map(|bounds| self.fit_camera(bounds, options.padding))
            }
        };
        if let Some(camera) = camera {
            self.app_state.set_camera(camera);
        }
        self.scroll_log.push((target, options));
    }

    fn stop_animation(&mut self) {
        self.stopped_animations += 1;
    }
}
