#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_ZOOM, MIN_ZOOM};

/// A world-space point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned world-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Bounds of a rectangle given by its top-left corner and size. Negative
    /// sizes (shapes drawn right-to-left) are normalized.
    #[must_use]
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x: x.min(x + width),
            min_y: y.min(y + height),
            max_x: x.max(x + width),
            max_y: y.max(y + height),
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) * 0.5, (self.min_y + self.max_y) * 0.5)
    }

    /// Smallest bounds containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Bounds) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Union of every bounds in `iter`, or `None` when it is empty.
    pub fn enclosing<I: IntoIterator<Item = Bounds>>(iter: I) -> Option<Self> {
        iter.into_iter().reduce(|acc, b| acc.union(&b))
    }
}

/// Scroll/zoom camera of the whiteboard.
///
/// Follows the whiteboard convention: `scroll_x` / `scroll_y` are world-space
/// offsets added before scaling, so `screen = (world + scroll) * zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { scroll_x: 0.0, scroll_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Camera that shows `bounds` centred in a `viewport_width` x
    /// `viewport_height` viewport with `padding` screen pixels on every side.
    ///
    /// Zoom is clamped to `[MIN_ZOOM, MAX_ZOOM]`; degenerate bounds (a point or
    /// a line) zoom in to the maximum instead of dividing by zero.
    #[must_use]
    pub fn fit(bounds: Bounds, viewport_width: f64, viewport_height: f64, padding: f64) -> Self {
        let viewport_width = viewport_width.max(1.0);
        let viewport_height = viewport_height.max(1.0);
        let avail_w = (viewport_width - 2.0 * padding).max(1.0);
        let avail_h = (viewport_height - 2.0 * padding).max(1.0);

        let zoom_w = if bounds.width() > 0.0 { avail_w / bounds.width() } else { MAX_ZOOM };
        let zoom_h = if bounds.height() > 0.0 { avail_h / bounds.height() } else { MAX_ZOOM };
        let zoom = zoom_w.min(zoom_h).clamp(MIN_ZOOM, MAX_ZOOM);

        let center = bounds.center();
        Self {
            scroll_x: viewport_width / (2.0 * zoom) - center.x,
            scroll_y: viewport_height / (2.0 * zoom) - center.y,
            zoom,
        }
    }
}
