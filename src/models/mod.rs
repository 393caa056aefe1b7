//! Request and response models.
//!
//! Partial-update payloads use double-`Option` fields to keep the
//! exclude-unset contract: an absent field is left untouched, an explicit
//! `null` clears the column.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

pub mod activity;
pub mod day;
pub mod trip;

pub use activity::{Activity, ActivityPayload};
pub use day::{CreateDay, Day, DayUpdate};
pub use trip::{CreateTrip, Trip, TripUpdate};

/// Deserialize a field so that `null` maps to `Some(None)` while an absent
/// field stays `None` via `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Add one double-`Option` field to a column patch.
pub(crate) fn patch_field<T: serde::Serialize>(
    patch: &mut Map<String, Value>,
    column: &str,
    field: Option<Option<T>>,
) {
    if let Some(value) = field {
        let rendered = match value {
            Some(v) => serde_json::to_value(v).unwrap_or(Value::Null),
            None => Value::Null,
        };
        patch.insert(column.to_string(), rendered);
    }
}
