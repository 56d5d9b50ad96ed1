use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use service::{pinning::FileUpload, proofs::{self, ProofReceipt}};

use crate::errors::JsonApiError;
use crate::observability::PROOF_UPLOADS_TOTAL;
use crate::state::AppState;

const PHOTO_FIELD: &str = "photo";

fn no_file() -> JsonApiError {
    JsonApiError::bad_request("No file uploaded", None)
}

/// Read the `photo` field; other fields are drained and ignored.
async fn read_photo(mut multipart: Multipart, max_bytes: usize) -> Result<Option<FileUpload>, JsonApiError> {
    let mut photo = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| JsonApiError::new(e.status(), "Upload failed", Some(e.body_text())))?
    {
        if photo.is_some() || field.name() != Some(PHOTO_FIELD) {
            continue;
        }
        let file_name = field.file_name().filter(|n| !n.is_empty()).unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| JsonApiError::new(e.status(), "Upload failed", Some(e.body_text())))?;
        if bytes.len() > max_bytes {
            return Err(JsonApiError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "File too large",
                Some(format!("limit is {} bytes", max_bytes)),
            ));
        }
        photo = Some(FileUpload { file_name, content_type, bytes: bytes.to_vec() });
    }
    Ok(photo)
}

pub async fn upload_proof(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProofReceipt>, JsonApiError> {
    let multipart = multipart.map_err(|_| no_file())?;
    let upload = read_photo(multipart, state.max_upload_bytes).await?.ok_or_else(no_file)?;
    let receipt = proofs::upload_proof(state.pinning.as_ref(), upload)
        .await
        .map_err(|e| JsonApiError::from_service("Upload failed", e))?;
    PROOF_UPLOADS_TOTAL.inc();
    Ok(Json(receipt))
}
