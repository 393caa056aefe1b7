//! Access policy engine.
//!
//! Access is recorded per (user, trip) in the `user_access` table; every
//! check re-queries the store, there is no caching. A missing grant is a
//! plain deny, never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::{DataStore, Filter};

use super::Claims;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessRole {
    Viewer,
    Editor,
    Owner,
}

impl AccessRole {
    /// Roles allowed to read a trip and its children.
    pub const READ: &'static [AccessRole] =
        &[AccessRole::Viewer, AccessRole::Editor, AccessRole::Owner];

    /// Roles allowed to mutate a trip and its children.
    pub const WRITE: &'static [AccessRole] = &[AccessRole::Editor, AccessRole::Owner];

    pub fn parse(s: &str) -> Option<AccessRole> {
        match s {
            "VIEWER" => Some(AccessRole::Viewer),
            "EDITOR" => Some(AccessRole::Editor),
            "OWNER" => Some(AccessRole::Owner),
            _ => None,
        }
    }
}

/// Decide whether the token's subject holds one of `roles` on the trip.
///
/// With no trip id the grant lookup is by user alone. Duplicate grant rows
/// are not expected (the store should carry a unique index on
/// (user_id, trip_id)); if present, the first row wins.
pub async fn has_access(
    store: &dyn DataStore,
    claims: &Claims,
    roles: &[AccessRole],
    trip_id: Option<&Uuid>,
) -> Result<bool, ApiError> {
    let user_id = claims.subject().map_err(ApiError::from)?;

    let mut filters = vec![Filter::eq("user_id", user_id)];
    if let Some(trip_id) = trip_id {
        filters.push(Filter::eq("trip_id", trip_id.to_string()));
    }

    let rows = store.select("user_access", &filters, None).await?;
    let Some(grant) = rows.first() else {
        return Ok(false);
    };

    let access_type = grant.get("access_type").and_then(Value::as_str).unwrap_or("");
    Ok(AccessRole::parse(access_type).is_some_and(|role| roles.contains(&role)))
}

/// Authorization gate invoked as a precondition by every resource handler.
pub async fn require_access(
    store: &dyn DataStore,
    claims: &Claims,
    roles: &[AccessRole],
    trip_id: &Uuid,
) -> Result<(), ApiError> {
    if has_access(store, claims, roles, Some(trip_id)).await? {
        Ok(())
    } else {
        Err(ApiError::forbidden("Access denied: Insufficient role"))
    }
}

/// A user must have a profile row before it can own a trip. Pass-through
/// guard: claims are not transformed.
pub async fn ensure_user_exists(store: &dyn DataStore, claims: &Claims) -> Result<(), ApiError> {
    let user_id = claims.subject().map_err(ApiError::from)?;

    let rows = store
        .select("profiles", &[Filter::eq("user_id", user_id)], None)
        .await?;

    if rows.is_empty() {
        return Err(ApiError::not_found(
            "User not found or unauthorized to create trips",
        ));
    }
    Ok(())
}
