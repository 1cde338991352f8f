//! Read models for the side panel and the property panel.

#[cfg(test)]
#[path = "panel_test.rs"]
mod panel_test;

use std::collections::BTreeSet;

use crate::consts::{CURRENCY_LABEL, SHORT_ID_LEN};
use crate::cycle::CycleGuard;
use crate::metadata::{BookingUnit, children_in, units_in};
use crate::scene::{Shape, ShapeId};
use crate::unit::{PriceUnit, Weekday};

/// One row of the side panel.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitSummary {
    pub id: ShapeId,
    pub short_id: String,
    pub name: String,
    /// e.g. `"25 Ar/h"`; `None` when the unit has no positive price.
    pub price_badge: Option<String>,
    pub working_day_count: usize,
    /// Children that still resolve to units.
    pub child_count: usize,
}

/// Badge text for a price, or `None` for an absent or zero price.
#[must_use]
pub fn price_badge(price: Option<f64>, unit: PriceUnit) -> Option<String> {
    let price = price.filter(|p| *p > 0.0)?;
    Some(format!("{price} {CURRENCY_LABEL}{}", unit.badge_suffix()))
}

/// Units whose name contains `query`, ignoring case. An empty query matches all.
#[must_use]
pub fn search_units<'a>(units: &'a [BookingUnit], query: &str) -> Vec<&'a BookingUnit> {
    let needle = query.to_lowercase();
    units
        .iter()
        .filter(|unit| needle.is_empty() || unit.name.to_lowercase().contains(&needle))
        .collect()
}

/// Side panel rows for every unit matching `query`, in scene order.
#[must_use]
pub fn side_panel(shapes: &[Shape], query: &str) -> Vec<UnitSummary> {
    let units = units_in(shapes);
    search_units(&units, query)
        .into_iter()
        .map(|unit| UnitSummary {
            id: unit.id.clone(),
            short_id: unit.id.chars().take(SHORT_ID_LEN).collect(),
            name: unit.name.clone(),
            price_badge: price_badge(unit.price, unit.price_unit),
            working_day_count: unit.working_days.len(),
            child_count: children_in(shapes, &unit.id).len(),
        })
        .collect()
}

/// Units that may be linked under `unit_id`: every other unit that is not
/// already a child and would not close a cycle.
#[must_use]
pub fn link_candidates(shapes: &[Shape], unit_id: &str) -> Vec<BookingUnit> {
    let guard = CycleGuard::new(shapes);
    let existing: BTreeSet<&str> = shapes
        .iter()
        .find(|shape| shape.id == unit_id)
        .map(|shape| shape.metadata.children.iter().map(String::as_str).collect())
        .unwrap_or_default();
    units_in(shapes)
        .into_iter()
        .filter(|unit| unit.id != unit_id)
        .filter(|unit| !existing.contains(unit.id.as_str()))
        .filter(|unit| !guard.would_create_cycle(unit_id, &unit.id))
        .collect()
}

/// Property panel for one selected shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPanel {
    pub id: ShapeId,
    pub name: String,
    /// Price, unit, days and links are editable only once a name is set.
    pub fields_unlocked: bool,
    pub price: Option<f64>,
    pub price_unit: PriceUnit,
    pub working_days: BTreeSet<Weekday>,
    pub children: Vec<BookingUnit>,
    pub candidates: Vec<BookingUnit>,
}

/// Property panel for `selected_id`, or `None` if it is missing or not bookable.
#[must_use]
pub fn property_panel(shapes: &[Shape], selected_id: &str) -> Option<PropertyPanel> {
    let shape = shapes.iter().find(|shape| shape.id == selected_id)?;
    if !shape.kind.is_bookable() {
        return None;
    }
    let attrs = &shape.metadata;
    let fields_unlocked = attrs.is_named();
    Some(PropertyPanel {
        id: shape.id.clone(),
        name: attrs.name.clone().unwrap_or_default(),
        fields_unlocked,
        price: attrs.price,
        price_unit: attrs.effective_price_unit(),
        working_days: attrs.working_days.clone(),
        children: children_in(shapes, selected_id),
        candidates: if fields_unlocked { link_candidates(shapes, selected_id) } else { Vec::new() },
    })
}
