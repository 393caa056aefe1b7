use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A stored activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub day_id: Uuid,
    pub name: String,
    pub location: String,
    pub description: String,
    pub position: i32,
    pub start_time: NaiveTime,
    pub duration: i32,
    pub category: String,
}

/// Client-submitted activity. Identity rule: no `id` means a new activity,
/// an `id` refers to an existing one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    pub location: String,
    pub description: String,
    pub position: i32,
    pub start_time: NaiveTime,
    pub duration: i32,
    pub category: String,
}

impl ActivityPayload {
    /// Non-id columns, used when updating an existing activity.
    pub fn column_patch(&self) -> Map<String, Value> {
        let mut patch = Map::new();
        patch.insert("name".to_string(), Value::String(self.name.clone()));
        patch.insert("location".to_string(), Value::String(self.location.clone()));
        patch.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        patch.insert("position".to_string(), Value::from(self.position));
        patch.insert(
            "start_time".to_string(),
            serde_json::to_value(self.start_time).unwrap_or(Value::Null),
        );
        patch.insert("duration".to_string(), Value::from(self.duration));
        patch.insert("category".to_string(), Value::String(self.category.clone()));
        patch
    }

    /// A full row for insertion, stamped with its parent day. Any
    /// client-sent id is dropped; the store assigns identity.
    pub fn insert_row(&self, day_id: &Uuid) -> Value {
        let mut row = self.column_patch();
        row.insert("day_id".to_string(), Value::String(day_id.to_string()));
        Value::Object(row)
    }
}
