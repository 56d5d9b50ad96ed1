use async_trait::async_trait;
use common::pinata::{PinResponse, PinataClient};
use serde_json::Value;

use crate::errors::ServiceError;

/// One pinned document as reported by the pinning service's listing.
#[derive(Clone, Debug, PartialEq)]
pub struct PinnedFile {
    pub cid: String,
    pub name: String,
    pub size: u64,
    pub date_pinned: Option<String>,
}

/// Result of a successful pin.
#[derive(Clone, Debug, PartialEq)]
pub struct PinReceipt {
    pub ipfs_hash: String,
    pub pin_size: u64,
    pub timestamp: String,
}

impl From<PinResponse> for PinReceipt {
    fn from(r: PinResponse) -> Self {
        Self { ipfs_hash: r.ipfs_hash, pin_size: r.pin_size, timestamp: r.timestamp }
    }
}

/// A file received from a client, buffered in memory.
#[derive(Clone, Debug)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Content-addressed storage used for proofs and the organization registry.
#[async_trait]
pub trait PinningService: Send + Sync {
    /// Pinned files whose logical name is `name`. Callers must still check the
    /// name: providers may match loosely.
    async fn list_files(&self, name: &str) -> Result<Vec<PinnedFile>, ServiceError>;
    async fn fetch_json(&self, cid: &str) -> Result<Value, ServiceError>;
    async fn pin_json(&self, name: &str, body: Value) -> Result<PinReceipt, ServiceError>;
    async fn pin_file(&self, upload: FileUpload) -> Result<PinReceipt, ServiceError>;
}

#[async_trait]
impl PinningService for PinataClient {
    async fn list_files(&self, name: &str) -> Result<Vec<PinnedFile>, ServiceError> {
        let list = self.pin_list(name).await?;
        Ok(list
            .rows
            .into_iter()
            .map(|row| PinnedFile {
                cid: row.ipfs_pin_hash,
                name: row.metadata.name.unwrap_or_default(),
                size: row.size,
                date_pinned: row.date_pinned,
            })
            .collect())
    }

    async fn fetch_json(&self, cid: &str) -> Result<Value, ServiceError> {
        Ok(self.gateway_json(cid).await?)
    }

    async fn pin_json(&self, name: &str, body: Value) -> Result<PinReceipt, ServiceError> {
        Ok(PinataClient::pin_json(self, name, &body).await?.into())
    }

    async fn pin_file(&self, upload: FileUpload) -> Result<PinReceipt, ServiceError> {
        let resp = PinataClient::pin_file(self, &upload.file_name, upload.content_type.as_deref(), upload.bytes).await?;
        Ok(resp.into())
    }
}

/// Simple in-memory pinning service for tests and local runs.
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Clone, Debug)]
    struct StoredPin {
        file: PinnedFile,
        content: Value,
    }

    #[derive(Default)]
    struct MockState {
        pins: Vec<StoredPin>, // newest first, like Pinata's default ordering
        seq: u64,
        fail_list: bool,
        garble_list: bool,
        fail_fetch: bool,
        garble_fetch: bool,
        fail_upload: bool,
        list_calls: usize,
        json_uploads: usize,
        file_uploads: usize,
    }

    #[derive(Default)]
    pub struct MockPinningService {
        state: Mutex<MockState>,
    }

    impl MockPinningService {
        pub fn new() -> Self { Self::default() }

        fn pin(state: &mut MockState, name: &str, size: u64, content: Value) -> PinReceipt {
            state.seq += 1;
            let cid = format!("bafymock{:04}", state.seq);
            let timestamp = format!("2024-01-01T00:00:00.{:03}Z", state.seq % 1000);
            state.pins.insert(0, StoredPin {
                file: PinnedFile { cid: cid.clone(), name: name.to_string(), size, date_pinned: Some(timestamp.clone()) },
                content,
            });
            PinReceipt { ipfs_hash: cid, pin_size: size, timestamp }
        }

        /// Pin a document directly, bypassing failure switches and counters.
        pub fn seed_json(&self, name: &str, content: Value) -> String {
            let mut state = self.state.lock().unwrap();
            let size = content.to_string().len() as u64;
            Self::pin(&mut state, name, size, content).ipfs_hash
        }

        pub fn fail_list(&self, fail: bool) { self.state.lock().unwrap().fail_list = fail; }
        pub fn fail_fetch(&self, fail: bool) { self.state.lock().unwrap().fail_fetch = fail; }
        /// Answer listings or gateway fetches with an unparsable body.
        pub fn garble_list(&self, garble: bool) { self.state.lock().unwrap().garble_list = garble; }
        pub fn garble_fetch(&self, garble: bool) { self.state.lock().unwrap().garble_fetch = garble; }
        pub fn fail_upload(&self, fail: bool) { self.state.lock().unwrap().fail_upload = fail; }

        pub fn list_calls(&self) -> usize { self.state.lock().unwrap().list_calls }
        pub fn json_uploads(&self) -> usize { self.state.lock().unwrap().json_uploads }
        pub fn file_uploads(&self) -> usize { self.state.lock().unwrap().file_uploads }

        /// Content pinned under `cid`, if any.
        pub fn content(&self, cid: &str) -> Option<Value> {
            let state = self.state.lock().unwrap();
            state.pins.iter().find(|p| p.file.cid == cid).map(|p| p.content.clone())
        }
    }

    #[async_trait]
    impl PinningService for MockPinningService {
        async fn list_files(&self, name: &str) -> Result<Vec<PinnedFile>, ServiceError> {
            let mut state = self.state.lock().unwrap();
            state.list_calls += 1;
            if state.fail_list {
                return Err(ServiceError::Upstream("mock listing unavailable".into()));
            }
            if state.garble_list {
                return Err(ServiceError::Serialization("mock listing body is not JSON".into()));
            }
            Ok(state.pins.iter().filter(|p| p.file.name == name).map(|p| p.file.clone()).collect())
        }

        async fn fetch_json(&self, cid: &str) -> Result<Value, ServiceError> {
            let state = self.state.lock().unwrap();
            if state.fail_fetch {
                return Err(ServiceError::Upstream("mock gateway unavailable".into()));
            }
            if state.garble_fetch {
                return Err(ServiceError::Serialization("mock gateway body is not JSON".into()));
            }
            state
                .pins
                .iter()
                .find(|p| p.file.cid == cid)
                .map(|p| p.content.clone())
                .ok_or_else(|| ServiceError::Upstream(format!("cid {} not found", cid)))
        }

        async fn pin_json(&self, name: &str, body: Value) -> Result<PinReceipt, ServiceError> {
            let mut state = self.state.lock().unwrap();
            if state.fail_upload {
                return Err(ServiceError::Upstream("mock upload rejected".into()));
            }
            state.json_uploads += 1;
            let size = body.to_string().len() as u64;
            Ok(Self::pin(&mut state, name, size, body))
        }

        async fn pin_file(&self, upload: FileUpload) -> Result<PinReceipt, ServiceError> {
            let mut state = self.state.lock().unwrap();
            if state.fail_upload {
                return Err(ServiceError::Upstream("mock upload rejected".into()));
            }
            state.file_uploads += 1;
            let size = upload.bytes.len() as u64;
            Ok(Self::pin(&mut state, &upload.file_name, size, Value::Null))
        }
    }
}
