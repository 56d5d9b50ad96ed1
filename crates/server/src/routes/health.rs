use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use common::types::Health;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok".into(),
        network: state.chain.network.clone(),
        module_address: state.chain.module_address.clone(),
        pinata_configured: state.pinata_configured,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
