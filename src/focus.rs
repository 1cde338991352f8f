//! Focus controller: hover/selection highlight with camera zoom and restore.
//!
//! ```text
//!            focus(t)                        focus(t2)
//!   Idle ────────────────▶ Focusing(t, V0) ─────────▶ Focusing(t2, V0)
//!     ▲                          │
//!     └──────── release ─────────┘   camera back to V0 (or fit all)
//! ```
//!
//! Entering from `Idle` captures the camera once. Moving between targets keeps
//! that first capture, so leaving the focus session always returns to where
//! the user was before the first hover. Link and unlink never touch this
//! state; it is purely visual.
//!
//! The controller holds no canvas handle of its own. Each transition borrows
//! the element store it should act on.

#[cfg(test)]
#[path = "focus_test.rs"]
mod focus_test;

use tracing::debug;

use crate::camera::Camera;
use crate::canvas::{Canvas, ScrollOptions, ScrollTarget};
use crate::consts::{
    FOCUS_ANIMATION_MS, FOCUS_DIM_OPACITY, FOCUS_PADDING_PX, FULL_OPACITY, MAX_FOCUS_PADDING_PX,
    MIN_FOCUS_PADDING_PX,
};
use crate::scene::{Shape, ShapeId};
use crate::store::ElementStore;

/// Visual parameters of a focus transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusConfig {
    /// Opacity given to every shape except the target.
    pub dim_opacity: f64,
    /// Requested screen padding around the target.
    pub padding: f64,
    pub duration_ms: u64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self { dim_opacity: FOCUS_DIM_OPACITY, padding: FOCUS_PADDING_PX, duration_ms: FOCUS_ANIMATION_MS }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FocusState {
    Idle,
    Focusing {
        target: ShapeId,
        /// Camera before the session began. `None` when it could not be read.
        saved_view: Option<Camera>,
    },
}

pub struct FocusController {
    state: FocusState,
    config: FocusConfig,
}

impl Default for FocusController {
    fn default() -> Self {
        Self::new(FocusConfig::default())
    }
}

impl FocusController {
    #[must_use]
    pub fn new(config: FocusConfig) -> Self {
        Self { state: FocusState::Idle, config }
    }

    #[must_use]
    pub fn state(&self) -> &FocusState {
        &self.state
    }

    #[must_use]
    pub fn config(&self) -> FocusConfig {
        self.config
    }

    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match &self.state {
            FocusState::Focusing { target, .. } => Some(target),
            FocusState::Idle => None,
        }
    }

    #[must_use]
    pub fn saved_view(&self) -> Option<Camera> {
        match &self.state {
            FocusState::Focusing { saved_view, .. } => *saved_view,
            FocusState::Idle => None,
        }
    }

    #[must_use]
    pub fn is_focusing(&self) -> bool {
        matches!(self.state, FocusState::Focusing { .. })
    }

    /// Focus `target`: dim everything else and zoom toward it.
    ///
    /// Only booking units can be focused. If `target` is missing or is not a
    /// unit the controller ends up `Idle`. From `Idle` nothing visual happens;
    /// from an active session the session is released normally so the scene
    /// does not stay dimmed.
    pub fn focus<C: Canvas>(&mut self, store: &mut ElementStore<C>, target: &str) {
        let Some(shape) = store.find(target).filter(Shape::is_booking_unit) else {
            debug!(target, "focus target is not a unit in scene");
            self.release(store);
            return;
        };
        if self.target() == Some(target) {
            return;
        }

        let saved_view = match &self.state {
            FocusState::Idle => store.view().map(|view| view.camera()),
            FocusState::Focusing { saved_view, .. } => *saved_view,
        };

        let dim = self.config.dim_opacity;
        store.replace_all(|mut s| {
            s.opacity = if s.id == target { FULL_OPACITY } else { dim };
            s
        });
        store.scroll_to_content(
            ScrollTarget::Shapes(vec![shape.id.clone()]),
            ScrollOptions { padding: bounded_padding(self.config.padding, &shape), animate: true, duration_ms: self.config.duration_ms },
        );

        debug!(target, captured = saved_view.is_some(), "focus entered");
        self.state = FocusState::Focusing { target: shape.id, saved_view };
    }

    /// End the focus session: full opacity everywhere and the camera back to
    /// the saved view, or fitted to all content if none was saved.
    pub fn release<C: Canvas>(&mut self, store: &mut ElementStore<C>) {
        let FocusState::Focusing { saved_view, .. } = std::mem::replace(&mut self.state, FocusState::Idle) else {
            return;
        };

        store.replace_all(|mut s| {
            s.opacity = FULL_OPACITY;
            s
        });
        let target = saved_view.map_or(ScrollTarget::AllContent, ScrollTarget::View);
        store.scroll_to_content(
            target,
            ScrollOptions { padding: self.config.padding, animate: true, duration_ms: self.config.duration_ms },
        );
        debug!(restored = saved_view.is_some(), "focus released");
    }

    /// Drop focus without touching the scene, stopping any camera animation.
    /// Used when the scene itself is about to be replaced.
    pub fn cancel<C: Canvas>(&mut self, store: &mut ElementStore<C>) {
        if self.is_focusing() {
            store.stop_animation();
            debug!("focus cancelled");
        }
        self.state = FocusState::Idle;
    }
}

/// Padding for zooming to `shape`: the configured padding, shrunk for small
/// shapes, then clamped to `[MIN_FOCUS_PADDING_PX, MAX_FOCUS_PADDING_PX]`.
#[must_use]
pub fn bounded_padding(requested: f64, shape: &Shape) -> f64 {
    let extent = shape.width.abs().max(shape.height.abs());
    requested.min(extent).clamp(MIN_FOCUS_PADDING_PX, MAX_FOCUS_PADDING_PX)
}
