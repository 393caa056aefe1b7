//! PostgREST client for the remote store.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;

use crate::config::StoreConfig;

use super::{DataStore, Filter, FilterOp, Row, StoreError};

#[derive(Debug, Clone)]
pub struct RestStore {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn rpc_url(&self, procedure: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, procedure)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(key) = HeaderValue::from_str(&self.service_key) {
            headers.insert("apikey", key);
        }
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", self.service_key)) {
            headers.insert("authorization", bearer);
        }
        // Mutations report affected rows so callers can detect zero matches.
        headers.insert("prefer", HeaderValue::from_static("return=representation"));
        headers
    }
}

/// Render filters as PostgREST query parameters (`col=eq.v`, `col=in.(a,b)`).
fn filter_query(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| match &f.op {
            FilterOp::Eq(v) => (f.column.clone(), format!("eq.{}", literal(v))),
            FilterOp::In(vs) => {
                let items: Vec<String> = vs.iter().map(literal).collect();
                (f.column.clone(), format!("in.({})", items.join(",")))
            }
        })
        .collect()
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn read_rows(response: reqwest::Response) -> Result<Vec<Row>, StoreError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(StoreError::Api { status: status.as_u16(), body });
    }
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait]
impl DataStore for RestStore {
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&str>,
    ) -> Result<Vec<Row>, StoreError> {
        let mut query = filter_query(filters);
        query.push(("select".to_string(), "*".to_string()));
        if let Some(order) = order {
            query.push(("order".to_string(), order.to_string()));
        }
        tracing::debug!(table, "store select");
        let response = self
            .http
            .get(self.table_url(table))
            .headers(self.headers())
            .query(&query)
            .send()
            .await?;
        read_rows(response).await
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(table, count = rows.len(), "store insert");
        let response = self
            .http
            .post(self.table_url(table))
            .headers(self.headers())
            .json(&rows)
            .send()
            .await?;
        read_rows(response).await
    }

    async fn update(
        &self,
        table: &str,
        patch: Value,
        filters: &[Filter],
    ) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(table, "store update");
        let response = self
            .http
            .patch(self.table_url(table))
            .headers(self.headers())
            .query(&filter_query(filters))
            .json(&patch)
            .send()
            .await?;
        read_rows(response).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(table, "store delete");
        let response = self
            .http
            .delete(self.table_url(table))
            .headers(self.headers())
            .query(&filter_query(filters))
            .send()
            .await?;
        read_rows(response).await
    }

    async fn rpc(&self, procedure: &str, params: Value) -> Result<Value, StoreError> {
        tracing::debug!(procedure, "store rpc");
        let response = self
            .http
            .post(self.rpc_url(procedure))
            .headers(self.headers())
            .json(&params)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Api { status: status.as_u16(), body });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}
