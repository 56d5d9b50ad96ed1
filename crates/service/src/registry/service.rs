use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::domain::{OrganizationRecord, Registration, RegistrySnapshot, RegistryStatus};
use crate::errors::ServiceError;
use crate::pinning::{PinnedFile, PinningService};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoadState {
    NotLoaded,
    Loaded,
}

struct RegistryState {
    records: Vec<OrganizationRecord>,
    content_address: Option<String>,
    load_state: LoadState,
    last_id: i64,
}

impl RegistryState {
    fn empty() -> Self {
        Self { records: Vec::new(), content_address: None, load_state: LoadState::NotLoaded, last_id: 0 }
    }

    /// Millisecond timestamp id, bumped past the previous one when the clock
    /// has not moved on.
    fn next_id(&mut self, now_ms: i64) -> i64 {
        let id = now_ms.max(self.last_id.saturating_add(1));
        self.last_id = id;
        id
    }
}

/// What the loader found under the document name.
enum StoredDocument {
    Missing,
    Found { file: PinnedFile, records: Vec<OrganizationRecord> },
    Unreadable { cid: String, reason: String },
}

/// Loaded ids that can seed the id counter. `i64::MAX` leaves no room above it.
fn seed_id(id: &str) -> Option<i64> {
    id.parse::<i64>().ok().filter(|n| (1..i64::MAX).contains(n))
}

/// Organization registry: an in-memory list mirrored to one JSON document on
/// the pinning service.
///
/// Every load and every append+persist cycle runs under one lock, so
/// concurrent requests in this process are serialized. Memory is only
/// updated after the new document has been pinned.
pub struct OrganizationRegistry {
    store: Arc<dyn PinningService>,
    document_name: String,
    state: Mutex<RegistryState>,
}

impl OrganizationRegistry {
    pub fn new(store: Arc<dyn PinningService>, document_name: impl Into<String>) -> Self {
        Self { store, document_name: document_name.into(), state: Mutex::new(RegistryState::empty()) }
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub async fn status(&self) -> RegistryStatus {
        let state = self.state.lock().await;
        match (state.load_state, state.records.is_empty()) {
            (LoadState::NotLoaded, _) => RegistryStatus::NotLoaded,
            (LoadState::Loaded, true) => RegistryStatus::LoadedEmpty,
            (LoadState::Loaded, false) => RegistryStatus::LoadedNonEmpty,
        }
    }

    /// Load the persisted document if that has not happened yet. Never fails:
    /// a missing document means a first run, and a transient failure leaves
    /// the registry unloaded so the next access retries.
    pub async fn ensure_loaded(&self) {
        let mut state = self.state.lock().await;
        self.load_into(&mut state).await;
    }

    /// Current records and the address of the last persisted document.
    pub async fn snapshot(&self) -> RegistrySnapshot {
        let mut state = self.state.lock().await;
        self.load_into(&mut state).await;
        RegistrySnapshot {
            organizations: state.records.clone(),
            ipfs_hash: state.content_address.clone(),
            count: state.records.len(),
        }
    }

    /// Create a record from caller fields, pin the full updated list and
    /// commit it to memory once the pin succeeded.
    pub async fn register(&self, fields: Map<String, Value>) -> Result<Registration, ServiceError> {
        let mut state = self.state.lock().await;
        self.load_into(&mut state).await;
        if state.load_state == LoadState::NotLoaded {
            warn!(document = %self.document_name, "persisting organizations without the previous document");
        }

        let id = state.next_id(Utc::now().timestamp_millis());
        let registered_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let record = OrganizationRecord::new(id.to_string(), registered_at, fields);

        let body = {
            let next: Vec<&OrganizationRecord> = state.records.iter().chain(std::iter::once(&record)).collect();
            serde_json::to_value(&next)?
        };
        let receipt = match self.store.pin_json(&self.document_name, body).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, id = %record.id, "failed to save organizations");
                return Err(e);
            }
        };

        state.records.push(record.clone());
        state.content_address = Some(receipt.ipfs_hash.clone());
        info!(cid = %receipt.ipfs_hash, size = receipt.pin_size, count = state.records.len(), "organizations saved to IPFS");
        Ok(Registration { organization: record, ipfs_hash: receipt.ipfs_hash })
    }

    async fn load_into(&self, state: &mut RegistryState) {
        if state.load_state == LoadState::Loaded {
            return;
        }
        match self.fetch_document().await {
            Ok(StoredDocument::Found { file, records }) => {
                info!(count = records.len(), cid = %file.cid, size = file.size, "loaded organizations from IPFS");
                state.last_id = records.iter().filter_map(|r| seed_id(&r.id)).max().unwrap_or(0).max(state.last_id);
                state.records = records;
                state.content_address = Some(file.cid);
                state.load_state = LoadState::Loaded;
            }
            Ok(StoredDocument::Missing) => {
                info!("starting with empty organizations list");
                state.load_state = LoadState::Loaded;
            }
            Ok(StoredDocument::Unreadable { cid, reason }) => {
                warn!(cid = %cid, error = %reason, "organizations document unreadable; starting with empty organizations list");
                state.load_state = LoadState::Loaded;
            }
            Err(e) => {
                warn!(error = %e, "could not load organizations; will retry on next access");
            }
        }
    }

    /// Any error from listing or fetching is transient. Only a fetched body
    /// that is not a list of records counts as unreadable.
    async fn fetch_document(&self) -> Result<StoredDocument, ServiceError> {
        let files = self.store.list_files(&self.document_name).await?;
        let Some(latest) = latest_named(files, &self.document_name) else {
            return Ok(StoredDocument::Missing);
        };
        let content = self.store.fetch_json(&latest.cid).await?;
        let records = match content {
            Value::Null => Vec::new(),
            other => match serde_json::from_value::<Vec<OrganizationRecord>>(other) {
                Ok(records) => records,
                Err(e) => return Ok(StoredDocument::Unreadable { cid: latest.cid, reason: e.to_string() }),
            },
        };
        Ok(StoredDocument::Found { file: latest, records })
    }
}

/// Most recently pinned file with exactly this name. Listing order breaks ties.
fn latest_named(files: Vec<PinnedFile>, name: &str) -> Option<PinnedFile> {
    files
        .into_iter()
        .filter(|f| f.name == name)
        .reduce(|best, f| if f.date_pinned > best.date_pinned { f } else { best })
}
