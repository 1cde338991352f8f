//! Scene model: whiteboard elements, view state, and the persisted plan record.
//!
//! Shapes and view state mirror the whiteboard's native scene JSON. Only the
//! fields this layer reads are typed; everything else rides along in a
//! flattened `rest` map so a load/save cycle never drops canvas-owned data.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::camera::{Bounds, Camera};
use crate::consts::FULL_OPACITY;
use crate::unit::UnitAttrs;

pub use crate::unit::ShapeId;

/// Binary asset table (images) keyed by file id. Opaque to this layer.
pub type BinaryFiles = serde_json::Map<String, serde_json::Value>;

/// Element type. Only the first four can become booking units; any other
/// whiteboard type (arrow, text, freedraw, ...) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Diamond,
    Image,
    Other(String),
}

impl ShapeKind {
    /// Whether shapes of this kind can carry booking attributes.
    #[must_use]
    pub fn is_bookable(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Diamond => "diamond",
            Self::Image => "image",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for ShapeKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "rectangle" => Self::Rectangle,
            "ellipse" => Self::Ellipse,
            "diamond" => Self::Diamond,
            "image" => Self::Image,
            _ => Self::Other(raw),
        }
    }
}

impl From<ShapeKind> for String {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

fn full_opacity() -> f64 {
    FULL_OPACITY
}

/// `customData` that is not an object (e.g. `null` from another writer)
/// reads as empty attributes.
fn lenient_attrs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<UnitAttrs, D::Error> {
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(value @ serde_json::Value::Object(_)) => match UnitAttrs::deserialize(value) {
            Ok(attrs) => Ok(attrs),
            Err(e) => {
                debug!(error = %e, "customData unreadable; treated as empty");
                Ok(UnitAttrs::default())
            }
        },
        _ => Ok(UnitAttrs::default()),
    }
}

/// A whiteboard element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: ShapeId,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// Visual weight, 0..=100.
    #[serde(default = "full_opacity")]
    pub opacity: f64,
    /// Booking attributes. Written only by the metadata layer.
    #[serde(rename = "customData", default, deserialize_with = "lenient_attrs", skip_serializing_if = "UnitAttrs::is_empty")]
    pub metadata: UnitAttrs,
    /// Geometry and style fields owned by the canvas.
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl Shape {
    /// A bare shape at the origin with full opacity and no attributes.
    #[must_use]
    pub fn new(id: impl Into<ShapeId>, kind: ShapeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            opacity: FULL_OPACITY,
            metadata: UnitAttrs::default(),
            rest: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::from_rect(self.x, self.y, self.width, self.height)
    }

    /// True for a bookable shape with a non-empty name.
    #[must_use]
    pub fn is_booking_unit(&self) -> bool {
        self.kind.is_bookable() && self.metadata.is_named()
    }
}

/// Zoom as the whiteboard stores it (`{ "value": 1 }`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zoom {
    pub value: f64,
}

impl Default for Zoom {
    fn default() -> Self {
        Self { value: 1.0 }
    }
}

/// The part of the whiteboard app state this layer reads: camera, viewport
/// size, selection and the live collaborator list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
    #[serde(default)]
    pub zoom: Zoom,
    /// Viewport width in CSS pixels.
    #[serde(default)]
    pub width: f64,
    /// Viewport height in CSS pixels.
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub selected_element_ids: BTreeMap<ShapeId, bool>,
    #[serde(default)]
    pub collaborators: serde_json::Value,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            zoom: Zoom::default(),
            width: 0.0,
            height: 0.0,
            selected_element_ids: BTreeMap::new(),
            collaborators: serde_json::Value::Null,
            rest: serde_json::Map::new(),
        }
    }
}

impl ViewState {
    #[must_use]
    pub fn camera(&self) -> Camera {
        Camera { scroll_x: self.scroll_x, scroll_y: self.scroll_y, zoom: self.zoom.value }
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.scroll_x = camera.scroll_x;
        self.scroll_y = camera.scroll_y;
        self.zoom = Zoom { value: camera.zoom };
    }

    /// First id flagged as selected, if any.
    #[must_use]
    pub fn first_selected(&self) -> Option<&str> {
        self.selected_element_ids
            .iter()
            .find(|(_, selected)| **selected)
            .map(|(id, _)| id.as_str())
    }

    /// Copy with the live collaborator list emptied, as it is stored.
    #[must_use]
    pub fn without_collaborators(&self) -> Self {
        Self { collaborators: serde_json::Value::Array(Vec::new()), ..self.clone() }
    }
}

/// Everything stored for one floor plan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPlan {
    #[serde(default)]
    pub elements: Vec<Shape>,
    #[serde(default)]
    pub app_state: ViewState,
    #[serde(default)]
    pub files: BinaryFiles,
}

impl PersistedPlan {
    /// Build the storable record from a canvas change, dropping collaborators.
    #[must_use]
    pub fn capture(elements: Vec<Shape>, app_state: &ViewState, files: BinaryFiles) -> Self {
        Self { elements, app_state: app_state.without_collaborators(), files }
    }

    /// Lowest opacity of any element, or `None` for an empty scene.
    #[must_use]
    pub fn min_opacity(&self) -> Option<f64> {
        self.elements.iter().map(|shape| shape.opacity).reduce(f64::min)
    }

    /// True when some element sits below `threshold`, i.e. a dim effect is on
    /// screen and this snapshot is not a settled state.
    #[must_use]
    pub fn is_transient(&self, threshold: f64) -> bool {
        self.min_opacity().is_some_and(|min| min < threshold)
    }
}
