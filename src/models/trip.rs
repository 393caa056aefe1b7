use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{double_option, patch_field};

/// A stored trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub trip_duration: i32,
    pub start_date: Option<NaiveDate>,
}

/// Payload for trip creation. The owner comes from the token subject, not
/// from the body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTrip {
    pub name: String,
    pub description: Option<String>,
    pub trip_duration: i32,
    pub start_date: Option<NaiveDate>,
}

/// Exclude-unset partial update for a trip.
#[derive(Debug, Default, Deserialize)]
pub struct TripUpdate {
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub trip_duration: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_date: Option<Option<NaiveDate>>,
}

impl TripUpdate {
    /// Columns to write: only fields present in the payload appear.
    pub fn into_patch(self) -> Map<String, Value> {
        let mut patch = Map::new();
        patch_field(&mut patch, "name", self.name);
        patch_field(&mut patch, "description", self.description);
        patch_field(&mut patch, "trip_duration", self.trip_duration);
        patch_field(&mut patch, "start_date", self.start_date);
        patch
    }
}
