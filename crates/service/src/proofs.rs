//! Proof-photo uploads: one file in, one pin out.

use serde::Serialize;
use tracing::info;

use crate::errors::ServiceError;
use crate::pinning::{FileUpload, PinningService};

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProofReceipt {
    pub ipfs_hash: String,
    pub file_name: String,
    pub size: usize,
    pub timestamp: String,
}

pub async fn upload_proof(store: &dyn PinningService, upload: FileUpload) -> Result<ProofReceipt, ServiceError> {
    let file_name = upload.file_name.clone();
    let size = upload.bytes.len();
    let receipt = store.pin_file(upload).await?;
    info!(file_name = %file_name, size, pin_size = receipt.pin_size, cid = %receipt.ipfs_hash, "proof uploaded");
    Ok(ProofReceipt { ipfs_hash: receipt.ipfs_hash, file_name, size, timestamp: receipt.timestamp })
}
