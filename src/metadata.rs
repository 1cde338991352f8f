//! Booking metadata: unit attributes and the parent/child unit graph.
//!
//! DESIGN
//! ======
//! `BookingMetadata` borrows the element store for the duration of one call
//! and is the sole writer of shape `customData`. Every mutation is a single
//! `replace_all`, built from a fresh read of the scene, so two handlers firing
//! in the same tick cannot overwrite each other with a stale snapshot.
//!
//! ERROR HANDLING
//! ==============
//! A missing shape makes a mutation a no-op (`Ok(false)` / `Unchanged`): the
//! canvas may delete a shape between the event and the handler. Stale child ids
//! are filtered from reads and never reported. Only a link that would close a
//! cycle, or an out-of-range field value, is returned as an error, and neither
//! mutates anything.

#[cfg(test)]
#[path = "metadata_test.rs"]
mod metadata_test;

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, warn};

use crate::canvas::Canvas;
use crate::cycle::CycleGuard;
use crate::scene::{Shape, ShapeId, ShapeKind};
use crate::store::ElementStore;
use crate::unit::{PriceUnit, UnitField, Weekday, is_weekday};

/// Rejected metadata operations. None of these leave a partial write behind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetadataError {
    /// Linking would make `child` an ancestor of itself.
    #[error("linking {child} under {parent} would create a cycle")]
    CycleRejected { parent: ShapeId, child: ShapeId },

    /// Price must be finite and non-negative.
    #[error("invalid price: {0}")]
    InvalidPrice(f64),

    /// Weekday ids run 0..=6.
    #[error("invalid weekday: {0}")]
    InvalidWeekday(Weekday),
}

/// Result of a link request that was not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The child was appended.
    Linked,
    /// Nothing changed: already linked, self-link, or a side is not a unit.
    Unchanged,
}

/// Read-only projection of a named, bookable shape.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingUnit {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub name: String,
    pub price: Option<f64>,
    pub price_unit: PriceUnit,
    pub working_days: BTreeSet<Weekday>,
    /// Raw child ids, possibly stale. Use `list_children` for resolved units.
    pub children: Vec<ShapeId>,
}

impl BookingUnit {
    /// Project `shape`, or `None` if it is unnamed or of a non-bookable kind.
    #[must_use]
    pub fn from_shape(shape: &Shape) -> Option<Self> {
        if !shape.kind.is_bookable() {
            return None;
        }
        let name = shape.metadata.unit_name()?;
        Some(Self {
            id: shape.id.clone(),
            kind: shape.kind.clone(),
            name: name.to_owned(),
            price: shape.metadata.price,
            price_unit: shape.metadata.effective_price_unit(),
            working_days: shape.metadata.working_days.clone(),
            children: shape.metadata.children.clone(),
        })
    }
}

/// Every booking unit in `shapes`, in scene order.
#[must_use]
pub fn units_in(shapes: &[Shape]) -> Vec<BookingUnit> {
    shapes.iter().filter_map(BookingUnit::from_shape).collect()
}

/// Units listed in `unit_id`'s children, in link order. Stale ids, ids that
/// are no longer units, and repeated ids are dropped.
#[must_use]
pub fn children_in(shapes: &[Shape], unit_id: &str) -> Vec<BookingUnit> {
    let units = units_in(shapes);
    let Some(parent) = units.iter().find(|unit| unit.id == unit_id) else {
        return Vec::new();
    };
    let by_id: HashMap<&str, &BookingUnit> = units.iter().map(|unit| (unit.id.as_str(), unit)).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    parent
        .children
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter_map(|id| by_id.get(id.as_str()).map(|unit| (*unit).clone()))
        .collect()
}

/// Units that list `unit_id` among their children, in scene order.
#[must_use]
pub fn parents_in(shapes: &[Shape], unit_id: &str) -> Vec<BookingUnit> {
    units_in(shapes)
        .into_iter()
        .filter(|unit| unit.children.iter().any(|child| child == unit_id))
        .collect()
}

/// Booking metadata operations over a borrowed element store.
pub struct BookingMetadata<'a, C> {
    store: &'a mut ElementStore<C>,
}

impl<'a, C: Canvas> BookingMetadata<'a, C> {
    pub fn new(store: &'a mut ElementStore<C>) -> Self {
        Self { store }
    }

    /// Write one attribute on `unit_id`.
    ///
    /// Returns `Ok(false)` when the shape no longer exists or no canvas is
    /// mounted. Clearing the name demotes the unit to a plain shape but keeps
    /// its other attributes.
    pub fn set_field(&mut self, unit_id: &str, field: UnitField) -> Result<bool, MetadataError> {
        validate(&field)?;
        if self.store.find(unit_id).is_none() {
            debug!(unit_id, key = field.key(), "set_field on missing shape ignored");
            return Ok(false);
        }
        let committed = self.store.replace_all(|mut shape| {
            if shape.id == unit_id {
                shape.metadata.apply(&field);
            }
            shape
        });
        if committed {
            debug!(unit_id, key = field.key(), "unit field updated");
        }
        Ok(committed)
    }

    /// Append `child_id` to `parent_id`'s children.
    ///
    /// Self-links, repeat links and links where either side is not a unit are
    /// `Unchanged`. A link that would close a cycle is `CycleRejected`.
    pub fn link_child(&mut self, parent_id: &str, child_id: &str) -> Result<LinkOutcome, MetadataError> {
        if parent_id == child_id {
            return Ok(LinkOutcome::Unchanged);
        }
        let shapes = self.store.get_all();
        let parent = shapes.iter().find(|shape| shape.id == parent_id && shape.is_booking_unit());
        let child_is_unit = shapes.iter().any(|shape| shape.id == child_id && shape.is_booking_unit());
        let Some(parent) = parent else {
            return Ok(LinkOutcome::Unchanged);
        };
        if !child_is_unit || parent.metadata.has_child(child_id) {
            return Ok(LinkOutcome::Unchanged);
        }
        if CycleGuard::new(&shapes).would_create_cycle(parent_id, child_id) {
            warn!(parent_id, child_id, "link rejected: would create cycle");
            return Err(MetadataError::CycleRejected { parent: parent_id.to_owned(), child: child_id.to_owned() });
        }

        let committed = self.store.replace_all(|mut shape| {
            if shape.id == parent_id && !shape.metadata.has_child(child_id) {
                shape.metadata.children.push(child_id.to_owned());
            }
            shape
        });
        if !committed {
            return Ok(LinkOutcome::Unchanged);
        }
        debug!(parent_id, child_id, "unit linked");
        Ok(LinkOutcome::Linked)
    }

    /// Remove `child_id` from `parent_id`'s children. Returns whether anything
    /// was removed.
    pub fn unlink_child(&mut self, parent_id: &str, child_id: &str) -> bool {
        let linked = self
            .store
            .find(parent_id)
            .is_some_and(|parent| parent.metadata.has_child(child_id));
        if !linked {
            return false;
        }
        let committed = self.store.replace_all(|mut shape| {
            if shape.id == parent_id {
                shape.metadata.children.retain(|id| id != child_id);
            }
            shape
        });
        if committed {
            debug!(parent_id, child_id, "unit unlinked");
        }
        committed
    }

    /// All booking units in scene order.
    #[must_use]
    pub fn list_units(&self) -> Vec<BookingUnit> {
        units_in(&self.store.get_all())
    }

    /// Resolved children of `unit_id`; stale references are skipped.
    #[must_use]
    pub fn list_children(&self, unit_id: &str) -> Vec<BookingUnit> {
        children_in(&self.store.get_all(), unit_id)
    }

    /// Units that have `unit_id` as a child.
    #[must_use]
    pub fn list_parents(&self, unit_id: &str) -> Vec<BookingUnit> {
        parents_in(&self.store.get_all(), unit_id)
    }

    /// Whether linking `parent_id -> child_id` would be rejected as a cycle.
    #[must_use]
    pub fn would_create_cycle(&self, parent_id: &str, child_id: &str) -> bool {
        CycleGuard::new(&self.store.get_all()).would_create_cycle(parent_id, child_id)
    }
}

fn validate(field: &UnitField) -> Result<(), MetadataError> {
    match field {
        UnitField::Price(Some(price)) if !price.is_finite() || *price < 0.0 => {
            Err(MetadataError::InvalidPrice(*price))
        }
        UnitField::WorkingDays(days) => match days.iter().find(|day| !is_weekday(**day)) {
            Some(day) => Err(MetadataError::InvalidWeekday(*day)),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}
