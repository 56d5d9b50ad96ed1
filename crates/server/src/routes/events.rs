use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;
use service::chain::{self, DappEvent};

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct EventsOutput {
    pub events: Vec<Value>,
}

async fn module_events(state: &AppState, event: DappEvent, failure: &str) -> Result<Json<EventsOutput>, JsonApiError> {
    chain::module_events(state.events.as_ref(), state.chain.module_address.as_deref(), event)
        .await
        .map(|events| Json(EventsOutput { events }))
        .map_err(|e| JsonApiError::from_service(failure, e))
}

/// `FundAllocated` events of the module account.
pub async fn funds(State(state): State<AppState>) -> Result<Json<EventsOutput>, JsonApiError> {
    module_events(&state, DappEvent::FundAllocated, "Failed to query funds").await
}

/// `DonationReceived` events of the module account.
pub async fn donations(State(state): State<AppState>) -> Result<Json<EventsOutput>, JsonApiError> {
    module_events(&state, DappEvent::DonationReceived, "Failed to query donations").await
}
