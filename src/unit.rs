//! Typed booking attributes carried on each shape.
//!
//! The whiteboard gives every element a free-form `customData` bag. This layer
//! reads and writes that bag only through [`UnitAttrs`], a typed struct with
//! optional fields, so nothing downstream does string-keyed lookups. Keys this
//! layer does not know about are preserved in `extra` and written back as-is.
//!
//! The bag is shared with other writers, so decoding is per-field lenient: a
//! value of the wrong type or outside its range reads as absent instead of
//! failing the whole record.

#[cfg(test)]
#[path = "unit_test.rs"]
mod unit_test;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::consts::MAX_WEEKDAY;

/// Identifier of a whiteboard element. Immutable for the element's lifetime.
pub type ShapeId = String;

/// Weekday id, 0 = Sunday through 6 = Saturday.
pub type Weekday = u8;

/// Billing period a unit's price refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceUnit {
    Minute,
    #[default]
    Hour,
    Day,
    HalfDay,
    FullDay,
    Week,
    Month,
    Year,
}

impl PriceUnit {
    /// Every price unit in the order the property panel offers them.
    pub const ALL: [PriceUnit; 8] = [
        PriceUnit::Minute,
        PriceUnit::Hour,
        PriceUnit::Day,
        PriceUnit::HalfDay,
        PriceUnit::FullDay,
        PriceUnit::Week,
        PriceUnit::Month,
        PriceUnit::Year,
    ];

    /// Wire name, as stored in `customData.priceUnit`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::HalfDay => "half_day",
            Self::FullDay => "full_day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Suffix appended to a price badge, e.g. `"/h"`.
    #[must_use]
    pub fn badge_suffix(self) -> &'static str {
        match self {
            Self::Minute => "/min",
            Self::Hour => "/h",
            Self::Day => "/day",
            Self::HalfDay => "/half-day",
            Self::FullDay => "/full-day",
            Self::Week => "/wk",
            Self::Month => "/mo",
            Self::Year => "/yr",
        }
    }
}

impl fmt::Display for PriceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the eight price unit names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown price unit: {0}")]
pub struct ParsePriceUnitError(pub String);

impl FromStr for PriceUnit {
    type Err = ParsePriceUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| ParsePriceUnitError(s.to_owned()))
    }
}

/// Booking attributes attached to a shape, serialized as its `customData`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitAttrs {
    /// Display name. A shape is a booking unit only while this is non-empty.
    #[serde(default, deserialize_with = "lenient_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_price", skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Absent means [`PriceUnit::Hour`]; kept optional so untouched records
    /// round-trip without gaining a key.
    #[serde(default, deserialize_with = "lenient_price_unit", skip_serializing_if = "Option::is_none")]
    pub price_unit: Option<PriceUnit>,
    #[serde(default, deserialize_with = "lenient_working_days", skip_serializing_if = "BTreeSet::is_empty")]
    pub working_days: BTreeSet<Weekday>,
    /// Linked sub-units, in link order.
    #[serde(default, deserialize_with = "lenient_children", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ShapeId>,
    /// Keys owned by someone else; passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UnitAttrs {
    /// The name, if it is non-empty.
    #[must_use]
    pub fn unit_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    #[must_use]
    pub fn is_named(&self) -> bool {
        self.unit_name().is_some()
    }

    #[must_use]
    pub fn effective_price_unit(&self) -> PriceUnit {
        self.price_unit.unwrap_or_default()
    }

    #[must_use]
    pub fn has_child(&self, id: &str) -> bool {
        self.children.iter().any(|child| child == id)
    }

    /// True when serializing would produce an empty object.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.price_unit.is_none()
            && self.working_days.is_empty()
            && self.children.is_empty()
            && self.extra.is_empty()
    }

    /// Write one editable field. Children are not a field; they change only
    /// through link and unlink.
    pub fn apply(&mut self, field: &UnitField) {
        match field {
            UnitField::Name(name) => {
                self.name = if name.is_empty() { None } else { Some(name.clone()) };
            }
            UnitField::Price(price) => self.price = *price,
            UnitField::PriceUnit(unit) => self.price_unit = Some(*unit),
            UnitField::WorkingDays(days) => self.working_days = days.clone(),
        }
    }
}

/// One editable attribute and its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitField {
    /// Empty string clears the name, demoting the unit to a plain shape.
    Name(String),
    Price(Option<f64>),
    PriceUnit(PriceUnit),
    WorkingDays(BTreeSet<Weekday>),
}

impl UnitField {
    /// Wire key of the attribute this field writes.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Price(_) => "price",
            Self::PriceUnit(_) => "priceUnit",
            Self::WorkingDays(_) => "workingDays",
        }
    }
}

/// True when `day` is a valid weekday id.
#[must_use]
pub fn is_weekday(day: Weekday) -> bool {
    day <= MAX_WEEKDAY
}

// ── Lenient field decoding ──────────────────────────────────────

fn lenient_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(name)) => Some(name),
        _ => None,
    })
}

/// Numbers, or numeric strings as a form field would leave them.
fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let price = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(raw)) => match raw.trim().parse::<f64>() {
            Ok(price) => Some(price),
            Err(_) => None,
        },
        _ => None,
    };
    Ok(price.filter(|p| p.is_finite() && *p >= 0.0))
}

fn lenient_price_unit<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<PriceUnit>, D::Error> {
    let Some(Value::String(raw)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match raw.parse::<PriceUnit>() {
        Ok(unit) => Ok(Some(unit)),
        Err(e) => {
            debug!(error = %e, "stored price unit ignored");
            Ok(None)
        }
    }
}

fn lenient_working_days<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<Weekday>, D::Error> {
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(BTreeSet::new());
    };
    Ok(items.iter().filter_map(weekday_of).collect())
}

fn weekday_of(value: &Value) -> Option<Weekday> {
    let raw = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => match s.trim().parse::<u64>() {
            Ok(day) => day,
            Err(_) => return None,
        },
        _ => return None,
    };
    match Weekday::try_from(raw) {
        Ok(day) if is_weekday(day) => Some(day),
        _ => None,
    }
}

fn lenient_children<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ShapeId>, D::Error> {
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(id) => Some(id),
            _ => None,
        })
        .collect())
}
