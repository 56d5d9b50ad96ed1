//! Aptos indexer client for account events filtered by event type.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::ensure_success;
use crate::CoreError;

const EVENTS_QUERY: &str = r#"query getEvents($where_condition: events_bool_exp, $limit: Int, $order_by: [events_order_by!]) {
  events(where: $where_condition, limit: $limit, order_by: $order_by) {
    account_address
    creation_number
    data
    event_index
    sequence_number
    transaction_block_height
    transaction_version
    type
    indexed_type
  }
}"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<EventsData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct EventsData {
    #[serde(default)]
    events: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Clone)]
pub struct AptosClient {
    http: reqwest::Client,
    indexer_url: String,
}

impl AptosClient {
    pub fn new(http: reqwest::Client, indexer_url: impl Into<String>) -> Self {
        Self { http, indexer_url: indexer_url.into() }
    }

    /// Events emitted under `account` whose type is exactly `event_type`,
    /// oldest first.
    pub async fn account_events(&self, account: &str, event_type: &str, limit: u32) -> Result<Vec<Value>, CoreError> {
        let body = json!({
            "query": EVENTS_QUERY,
            "variables": {
                "where_condition": {
                    "account_address": { "_eq": account },
                    "indexed_type": { "_eq": event_type },
                },
                "limit": limit,
                "order_by": [{ "transaction_version": "asc" }],
            },
        });
        let resp = self
            .http
            .post(&self.indexer_url)
            .json(&body)
            .send()
            .await
            .map_err(CoreError::network)?;
        let resp = ensure_success(resp).await?;
        let parsed = resp.json::<GraphQlResponse>().await.map_err(CoreError::parse)?;
        extract_events(parsed)
    }
}

fn extract_events(resp: GraphQlResponse) -> Result<Vec<Value>, CoreError> {
    if !resp.errors.is_empty() {
        let msg = resp.errors.into_iter().map(|e| e.message).collect::<Vec<_>>().join("; ");
        return Err(CoreError::Remote(msg));
    }
    Ok(resp.data.map(|d| d.events).unwrap_or_default())
}
