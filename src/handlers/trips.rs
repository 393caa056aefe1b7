//! Trip CRUD handlers. Every handler authorizes first, then performs its
//! store operations and maps the result to a typed outcome.

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
use crate::models::{CreateTrip, Trip, TripUpdate};
use crate::state::AppState;
use crate::store::Filter;

/// GET /trips/:trip_id
pub async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    claims: Claims,
) -> Result<Json<Trip>, ApiError> {
    policy::require_access(state.store.as_ref(), &claims, AccessRole::READ, &trip_id).await?;

    tracing::info!(%trip_id, "retrieving trip");
    let rows = state
        .store
        .select("trips", &[Filter::eq("id", trip_id.to_string())], None)
        .await?;

    let Some(row) = rows.into_iter().next() else {
        return Err(ApiError::not_found("Trip not found"));
    };

    let trip: Trip = serde_json::from_value(Value::Object(row))
        .map_err(|e| ApiError::internal_server_error(format!("Internal server error: {}", e)))?;
    Ok(Json(trip))
}

/// POST /trips
///
/// Trip row and OWNER grant are created together by a single stored
/// procedure; a trip never exists without its owner grant.
pub async fn create_trip(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<CreateTrip>,
) -> Result<impl IntoResponse, ApiError> {
    policy::ensure_user_exists(state.store.as_ref(), &claims).await?;
    let user_id = claims.subject().map_err(ApiError::from)?;

    tracing::info!(name = %payload.name, "creating trip");
    let produced = state
        .store
        .rpc(
            "create_trip_with_user_access",
            json!({
                "p_name": payload.name,
                "p_description": payload.description,
                "p_trip_duration": payload.trip_duration,
                "p_start_date": payload.start_date,
                "p_user_id": user_id,
            }),
        )
        .await?;

    if !produced_identifier(&produced) {
        tracing::error!("trip creation procedure produced no identifier");
        return Err(ApiError::bad_request("Failed to create trip"));
    }

    Ok((StatusCode::CREATED, Json(json!({ "id": produced }))))
}

/// Whether an rpc result actually carries a new trip id. Null, an empty
/// string and an empty array all count as "nothing produced".
fn produced_identifier(result: &Value) -> bool {
    match result {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// PATCH /trips/:trip_id — exclude-unset partial update.
pub async fn update_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    claims: Claims,
    Json(payload): Json<TripUpdate>,
) -> Result<StatusCode, ApiError> {
    policy::require_access(state.store.as_ref(), &claims, AccessRole::WRITE, &trip_id).await?;

    let patch = payload.into_patch();
    if patch.is_empty() {
        return Ok(StatusCode::NO_CONTENT);
    }

    let rows = state
        .store
        .update(
            "trips",
            Value::Object(patch),
            &[Filter::eq("id", trip_id.to_string())],
        )
        .await?;

    if rows.is_empty() {
        return Err(ApiError::not_found("Trip not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /trips/:trip_id
pub async fn delete_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    claims: Claims,
) -> Result<StatusCode, ApiError> {
    policy::require_access(state.store.as_ref(), &claims, AccessRole::WRITE, &trip_id).await?;

    tracing::info!(%trip_id, "deleting trip");
    let rows = state
        .store
        .delete("trips", &[Filter::eq("id", trip_id.to_string())])
        .await?;

    if rows.is_empty() {
        return Err(ApiError::not_found("Trip not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
