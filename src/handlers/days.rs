//! Day handlers, including the day/activity reconciliation endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::policy::{self, AccessRole};
use crate::auth::Claims;
use crate::error::ApiError;
use crate::models::{CreateDay, Day, DayUpdate};
use crate::reconcile;
use crate::state::AppState;
use crate::store::Filter;

/// POST /trips/:trip_id/days
///
/// Inserts the day row, then batch-inserts any submitted activities stamped
/// with the new day id. The two inserts are not atomic: an activity batch
/// failure leaves the day row in place.
pub async fn create_day(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    claims: Claims,
    Json(payload): Json<CreateDay>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_access(state.store.as_ref(), &claims, AccessRole::WRITE, &trip_id).await?;

    tracing::info!(%trip_id, day_number = payload.day_number, "creating day");
    let rows = state
        .store
        .insert(
            "days",
            vec![json!({
                "trip_id": trip_id,
                "name": payload.name,
                "description": payload.description,
                "day_number": payload.day_number,
            })],
        )
        .await?;

    let day_id = rows
        .first()
        .and_then(|row| row.get("id"))
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| ApiError::bad_request("Failed to create day"))?;

    if let Some(activities) = payload.activities.filter(|a| !a.is_empty()) {
        let batch: Vec<Value> = activities
            .iter()
            .map(|activity| activity.insert_row(&day_id))
            .collect();
        tracing::info!(%day_id, count = batch.len(), "inserting initial activities");
        state.store.insert("activities", batch).await?;
    }

    Ok((StatusCode::CREATED, Json(json!({ "id": day_id }))))
}

/// GET /trips/:trip_id/days — all days for the trip, ordered by day number.
pub async fn list_days(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    claims: Claims,
) -> Result<Json<Vec<Day>>, ApiError> {
    policy::require_access(state.store.as_ref(), &claims, AccessRole::READ, &trip_id).await?;

    let rows = state
        .store
        .select(
            "days",
            &[Filter::eq("trip_id", trip_id.to_string())],
            Some("day_number.asc"),
        )
        .await?;

    let days: Vec<Day> = rows
        .into_iter()
        .map(|row| serde_json::from_value(Value::Object(row)))
        .collect::<Result<_, _>>()
        .map_err(|e| ApiError::internal_server_error(format!("Internal server error: {}", e)))?;
    Ok(Json(days))
}

/// DELETE /trips/:trip_id/days/:day_id
///
/// The compound (id, trip_id) filter keeps a day id from another trip from
/// matching. Activity cleanup is the store's referential-constraint concern.
pub async fn delete_day(
    State(state): State<AppState>,
    Path((trip_id, day_id)): Path<(Uuid, Uuid)>,
    claims: Claims,
) -> Result<StatusCode, ApiError> {
    policy::require_access(state.store.as_ref(), &claims, AccessRole::WRITE, &trip_id).await?;

    tracing::info!(%trip_id, %day_id, "deleting day");
    let rows = state
        .store
        .delete(
            "days",
            &[
                Filter::eq("id", day_id.to_string()),
                Filter::eq("trip_id", trip_id.to_string()),
            ],
        )
        .await?;

    if rows.is_empty() {
        return Err(ApiError::not_found("Day not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /trips/:trip_id/days/:day_id
///
/// Scalar fields are an exclude-unset update; a present activities field is
/// reconciled to exactly match the submitted set. Sub-steps run without a
/// wrapping transaction, so the first failure aborts the rest and reports a
/// single internal error.
pub async fn update_day(
    State(state): State<AppState>,
    Path((trip_id, day_id)): Path<(Uuid, Uuid)>,
    claims: Claims,
    Json(payload): Json<DayUpdate>,
) -> Result<StatusCode, ApiError> {
    policy::require_access(state.store.as_ref(), &claims, AccessRole::WRITE, &trip_id).await?;

    let (patch, activities) = payload.into_parts();

    if !patch.is_empty() {
        let rows = state
            .store
            .update(
                "days",
                Value::Object(patch),
                &[
                    Filter::eq("id", day_id.to_string()),
                    Filter::eq("trip_id", trip_id.to_string()),
                ],
            )
            .await?;
        if rows.is_empty() {
            return Err(ApiError::not_found("Day not found"));
        }
    } else if activities.is_some() {
        // No scalar update ran, so the day's membership in the path's trip
        // has not been checked yet. Reconciling by day id alone would let a
        // grant on one trip reach into another trip's day.
        let rows = state
            .store
            .select(
                "days",
                &[
                    Filter::eq("id", day_id.to_string()),
                    Filter::eq("trip_id", trip_id.to_string()),
                ],
                None,
            )
            .await?;
        if rows.is_empty() {
            return Err(ApiError::not_found("Day not found"));
        }
    }

    if let Some(submitted) = activities {
        let current = reconcile::current_activity_ids(state.store.as_ref(), &day_id).await?;
        let plan = reconcile::plan(&current, submitted);
        tracing::info!(
            %day_id,
            deletes = plan.to_delete.len(),
            updates = plan.to_update.len(),
            inserts = plan.to_insert.len(),
            "reconciling day activities"
        );
        reconcile::apply(state.store.as_ref(), &day_id, plan).await?;
    }

    Ok(StatusCode::NO_CONTENT)
}
