//! Shared reqwest helpers for the upstream clients.

use std::time::Duration;

use crate::CoreError;

/// Build the HTTP client shared by the chain and pinning clients.
pub fn build_client(connect_timeout: Duration, request_timeout: Duration) -> Result<reqwest::Client, CoreError> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(CoreError::network)
}

/// Turn a non-2xx response into `CoreError::Status`, keeping the body for diagnostics.
pub(crate) async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, CoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(CoreError::Status { status: status.as_u16(), body })
}
