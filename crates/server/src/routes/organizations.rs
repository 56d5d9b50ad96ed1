use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use serde_json::{Map, Value};
use service::errors::ServiceError;
use service::registry::{OrganizationRecord, RegistrySnapshot};
use tracing::info;

use crate::errors::JsonApiError;
use crate::observability::{REGISTRY_WRITES_TOTAL, REGISTRY_WRITE_FAILURES_TOTAL};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOutput {
    pub success: bool,
    pub organization: OrganizationRecord,
    pub ipfs_hash: String,
}

/// Caller fields for a new organization. An empty body (or `null`) is an
/// empty field set; anything other than a JSON object is rejected.
fn parse_fields(body: &[u8]) -> Result<Map<String, Value>, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(_) => Err(ServiceError::Validation("expected a JSON object".into())),
        Err(e) => Err(ServiceError::Validation(e.to_string())),
    }
}

pub async fn register_organization(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RegisterOutput>, JsonApiError> {
    let fields = parse_fields(&body).map_err(|e| JsonApiError::from_service("Invalid organization payload", e))?;
    match state.registry.register(fields).await {
        Ok(reg) => {
            REGISTRY_WRITES_TOTAL.inc();
            info!(id = %reg.organization.id, cid = %reg.ipfs_hash, "registered organization");
            Ok(Json(RegisterOutput { success: true, organization: reg.organization, ipfs_hash: reg.ipfs_hash }))
        }
        Err(e) => {
            REGISTRY_WRITE_FAILURES_TOTAL.inc();
            Err(JsonApiError::from_service("Registration failed", e))
        }
    }
}

pub async fn list_organizations(State(state): State<AppState>) -> Json<RegistrySnapshot> {
    Json(state.registry.snapshot().await)
}
