use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{double_option, patch_field, ActivityPayload};

/// A stored day. Uniqueness of `day_number` within a trip is a store
/// concern, not enforced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Day {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub day_number: i32,
}

/// Payload for day creation, optionally carrying the day's initial
/// activities.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDay {
    pub name: String,
    pub description: Option<String>,
    pub day_number: i32,
    #[serde(default)]
    pub activities: Option<Vec<ActivityPayload>>,
}

/// Exclude-unset partial update for a day. The `activities` field is the
/// desired full set for the day: omitted means "do not touch activities",
/// an empty list means "delete them all".
#[derive(Debug, Default, Deserialize)]
pub struct DayUpdate {
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub day_number: Option<Option<i32>>,
    #[serde(default)]
    pub activities: Option<Vec<ActivityPayload>>,
}

impl DayUpdate {
    /// Split into the scalar column patch and the submitted activity set.
    pub fn into_parts(self) -> (Map<String, Value>, Option<Vec<ActivityPayload>>) {
        let mut patch = Map::new();
        patch_field(&mut patch, "name", self.name);
        patch_field(&mut patch, "description", self.description);
        patch_field(&mut patch, "day_number", self.day_number);
        (patch, self.activities)
    }
}
