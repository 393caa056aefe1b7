//! Day/activity reconciliation.
//!
//! A day update may carry the desired full activity set. Reconciliation
//! converges stored state to that set with a minimal diff: one batched
//! delete for rows no longer present, a per-row update for survivors, one
//! batched insert for new entries.

use std::collections::HashSet;

use serde_json::Value;
use uuid::Uuid;

use crate::models::ActivityPayload;
use crate::store::{DataStore, Filter, StoreError};

/// The diff between stored activities and a submitted set.
#[derive(Debug, Default)]
pub struct ReconcilePlan {
    /// Stored ids absent from the submitted set.
    pub to_delete: Vec<Uuid>,
    /// Submitted entries whose id exists in storage.
    pub to_update: Vec<ActivityPayload>,
    /// Submitted entries without an id.
    pub to_insert: Vec<ActivityPayload>,
}

/// Compute the diff. A submitted entry carrying an id unknown to storage is
/// ignored entirely: it is neither updated nor inserted, and its id still
/// shields nothing from deletion since it was never stored.
pub fn plan(current_ids: &[Uuid], submitted: Vec<ActivityPayload>) -> ReconcilePlan {
    let current: HashSet<Uuid> = current_ids.iter().copied().collect();
    let mut incoming: HashSet<Uuid> = HashSet::new();

    let mut result = ReconcilePlan::default();
    for activity in submitted {
        match activity.id {
            None => result.to_insert.push(activity),
            Some(id) => {
                incoming.insert(id);
                if current.contains(&id) {
                    result.to_update.push(activity);
                }
            }
        }
    }

    result.to_delete = current.difference(&incoming).copied().collect();
    // Deterministic batch order for logging and tests.
    result.to_delete.sort();
    result
}

/// Fetch the ids of the activities currently stored for a day.
pub async fn current_activity_ids(
    store: &dyn DataStore,
    day_id: &Uuid,
) -> Result<Vec<Uuid>, StoreError> {
    let rows = store
        .select(
            "activities",
            &[Filter::eq("day_id", day_id.to_string())],
            None,
        )
        .await?;

    rows.iter()
        .map(|row| {
            row.get("id")
                .and_then(Value::as_str)
                .and_then(|s| Uuid::parse_str(s).ok())
                .ok_or_else(|| StoreError::Decode("activity row without a valid id".to_string()))
        })
        .collect()
}

/// Apply a plan against the store. The three phases are not wrapped in a
/// transaction; the first failing phase aborts the rest and the partial
/// write stands.
pub async fn apply(
    store: &dyn DataStore,
    day_id: &Uuid,
    plan: ReconcilePlan,
) -> Result<(), StoreError> {
    if !plan.to_delete.is_empty() {
        let ids: Vec<Value> = plan
            .to_delete
            .iter()
            .map(|id| Value::String(id.to_string()))
            .collect();
        tracing::info!(%day_id, count = ids.len(), "deleting activities removed from the submitted set");
        store
            .delete(
                "activities",
                &[
                    Filter::eq("day_id", day_id.to_string()),
                    Filter::any_of("id", ids),
                ],
            )
            .await?;
    }

    for activity in &plan.to_update {
        // Guarded by plan(): every entry here has an id.
        let Some(id) = activity.id else { continue };
        store
            .update(
                "activities",
                Value::Object(activity.column_patch()),
                &[Filter::eq("id", id.to_string())],
            )
            .await?;
    }

    if !plan.to_insert.is_empty() {
        let rows: Vec<Value> = plan
            .to_insert
            .iter()
            .map(|activity| activity.insert_row(day_id))
            .collect();
        tracing::info!(%day_id, count = rows.len(), "inserting new activities");
        store.insert("activities", rows).await?;
    }

    Ok(())
}
