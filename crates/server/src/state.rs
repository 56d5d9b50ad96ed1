use std::sync::Arc;

use service::{chain::EventSource, pinning::PinningService, registry::OrganizationRegistry};

/// Network facts reported by `/health` and used to build event types.
#[derive(Clone, Debug)]
pub struct ChainInfo {
    pub network: String,
    pub module_address: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<OrganizationRegistry>,
    pub pinning: Arc<dyn PinningService>,
    pub events: Arc<dyn EventSource>,
    pub chain: ChainInfo,
    pub pinata_configured: bool,
    pub max_upload_bytes: usize,
}
