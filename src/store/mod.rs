//! Remote data store access.
//!
//! The store is a remote relational database exposed through a
//! PostgREST-style HTTP interface: row-level `select`/`insert`/`update`/
//! `delete` plus named stored procedures via `rpc`. Handlers depend on the
//! [`DataStore`] trait so the production REST client can be swapped for an
//! in-memory implementation in tests.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub mod rest;

pub use rest::RestStore;

/// One row as returned by the store.
pub type Row = Map<String, Value>;

/// A single column predicate applied to a store operation.
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
}

#[derive(Debug, Clone)]
pub enum FilterOp {
    Eq(Value),
    In(Vec<Value>),
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { column: column.into(), op: FilterOp::Eq(value.into()) }
    }

    pub fn any_of(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self { column: column.into(), op: FilterOp::In(values) }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(String),

    #[error("store returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unexpected store response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}

/// Operations every data store backend provides.
///
/// Mutating calls return the affected rows (`return=representation`
/// semantics); callers use an empty result to detect "nothing matched".
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&str>,
    ) -> Result<Vec<Row>, StoreError>;

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Row>, StoreError>;

    async fn update(
        &self,
        table: &str,
        patch: Value,
        filters: &[Filter],
    ) -> Result<Vec<Row>, StoreError>;

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, StoreError>;

    async fn rpc(&self, procedure: &str, params: Value) -> Result<Value, StoreError>;
}
