//! Shared test harness: an in-memory `DataStore`, a router wired to it, and
//! JWT minting helpers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Map, Value};
use tower::ServiceExt;
use uuid::Uuid;

use trip_api::auth::TokenValidator;
use trip_api::config::SecurityConfig;
use trip_api::routes::app;
use trip_api::state::AppState;
use trip_api::store::{DataStore, Filter, FilterOp, Row, StoreError};

pub const JWT_SECRET: &str = "test-secret";

/// In-memory stand-in for the remote store. Tables are plain row vectors;
/// filters support the eq/in operators the API uses.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Row>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn seed(&self, table: &str, row: Value) -> String {
        let mut object = match row {
            Value::Object(map) => map,
            other => panic!("seed row must be an object, got {}", other),
        };
        let id = object
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                let id = Uuid::new_v4().to_string();
                object.insert("id".to_string(), Value::String(id.clone()));
                id
            });
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(object);
        id
    }

    pub fn seed_profile(&self, user_id: &str) {
        self.seed("profiles", json!({ "user_id": user_id }));
    }

    pub fn seed_grant(&self, user_id: &str, trip_id: &str, access_type: &str) {
        self.seed(
            "user_access",
            json!({ "user_id": user_id, "trip_id": trip_id, "access_type": access_type }),
        );
    }

    pub fn seed_trip(&self, name: &str) -> String {
        self.seed(
            "trips",
            json!({
                "name": name,
                "description": "a trip",
                "trip_duration": 5,
                "start_date": "2026-09-01",
            }),
        )
    }

    pub fn seed_day(&self, trip_id: &str, day_number: i64) -> String {
        self.seed(
            "days",
            json!({
                "trip_id": trip_id,
                "name": format!("Day {}", day_number),
                "description": null,
                "day_number": day_number,
            }),
        )
    }

    pub fn seed_activity(&self, day_id: &str, name: &str, position: i64) -> String {
        self.seed(
            "activities",
            json!({
                "day_id": day_id,
                "name": name,
                "location": "old town",
                "description": "",
                "position": position,
                "start_time": "09:00:00",
                "duration": 60,
                "category": "SIGHTSEEING",
            }),
        )
    }
}

fn matches(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| {
        let Some(value) = row.get(&filter.column) else {
            return false;
        };
        match &filter.op {
            FilterOp::Eq(expected) => value == expected,
            FilterOp::In(options) => options.iter().any(|o| o == value),
        }
    })
}

fn sort_rows(rows: &mut [Row], order: &str) {
    let (column, descending) = match order.rsplit_once('.') {
        Some((column, "desc")) => (column, true),
        Some((column, _)) => (column, false),
        None => (order, false),
    };
    rows.sort_by(|a, b| {
        let left = a.get(column).and_then(Value::as_i64).unwrap_or_default();
        let right = b.get(column).and_then(Value::as_i64).unwrap_or_default();
        if descending {
            right.cmp(&left)
        } else {
            left.cmp(&right)
        }
    });
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&str>,
    ) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Row> = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| matches(r, filters)).cloned().collect())
            .unwrap_or_default();
        if let Some(order) = order {
            sort_rows(&mut rows, order);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Row>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let stored = tables.entry(table.to_string()).or_default();
        let mut inserted = Vec::new();
        for row in rows {
            let Value::Object(mut object) = row else {
                return Err(StoreError::Decode("insert expects object rows".to_string()));
            };
            object
                .entry("id".to_string())
                .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
            stored.push(object.clone());
            inserted.push(object);
        }
        Ok(inserted)
    }

    async fn update(
        &self,
        table: &str,
        patch: Value,
        filters: &[Filter],
    ) -> Result<Vec<Row>, StoreError> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::Decode("update expects an object patch".to_string()));
        };
        let mut tables = self.tables.lock().unwrap();
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| matches(r, filters)) {
                for (key, value) in &patch {
                    row.insert(key.clone(), value.clone());
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };
        let mut removed = Vec::new();
        rows.retain(|row| {
            if matches(row, filters) {
                removed.push(row.clone());
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    async fn rpc(&self, procedure: &str, params: Value) -> Result<Value, StoreError> {
        match procedure {
            // Mirrors the stored procedure contract: trip row and OWNER
            // grant are created together, the new trip id is returned.
            "create_trip_with_user_access" => {
                let user_id = params
                    .get("p_user_id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| StoreError::Decode("missing p_user_id".to_string()))?
                    .to_string();
                let trip_id = self.seed(
                    "trips",
                    json!({
                        "name": params.get("p_name").cloned().unwrap_or(Value::Null),
                        "description": params.get("p_description").cloned().unwrap_or(Value::Null),
                        "trip_duration": params.get("p_trip_duration").cloned().unwrap_or(Value::Null),
                        "start_date": params.get("p_start_date").cloned().unwrap_or(Value::Null),
                    }),
                );
                self.seed_grant(&user_id, &trip_id, "OWNER");
                Ok(Value::String(trip_id))
            }
            other => Err(StoreError::Api {
                status: 404,
                body: format!("unknown procedure {}", other),
            }),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let validator = TokenValidator::new(&SecurityConfig {
        jwt_secret: JWT_SECRET.to_string(),
        jwt_audience: "authenticated".to_string(),
        verify_expiry: true,
    });
    let router = app(AppState::new(store.clone(), validator));
    TestApp { router, store }
}

pub fn token_for(sub: &str) -> String {
    mint(json!({
        "sub": sub,
        "aud": "authenticated",
        "exp": chrono_now() + 3600,
    }))
}

pub fn token_without_sub() -> String {
    mint(json!({
        "aud": "authenticated",
        "exp": chrono_now() + 3600,
    }))
}

fn chrono_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_secs() as i64
}

fn mint(claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("token encoding")
}

pub async fn send(
    app: &TestApp,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<Response<Body>> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };
    Ok(app.router.clone().oneshot(request).await?)
}

pub async fn body_json(response: Response<Body>) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "unexpected status: {}",
        response.status()
    );
}

/// Convenience for tests needing an existing trip with a role grant.
pub fn seed_trip_for(store: &MemoryStore, user_id: &str, access_type: &str) -> String {
    let trip_id = store.seed_trip("Lisbon");
    store.seed_grant(user_id, &trip_id, access_type);
    trip_id
}

pub fn ids_of(rows: &[Map<String, Value>]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.get("id").and_then(Value::as_str).map(str::to_string))
        .collect()
}
