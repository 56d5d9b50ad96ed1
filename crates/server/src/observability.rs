use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static REGISTRY_WRITES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "dapptrack_registry_writes_total",
        "Organizations registered and persisted"
    )
    .expect("register registry_writes_total")
});

pub static REGISTRY_WRITE_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "dapptrack_registry_write_failures_total",
        "Registrations rejected because the registry document could not be pinned"
    )
    .expect("register registry_write_failures_total")
});

pub static PROOF_UPLOADS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "dapptrack_proof_uploads_total",
        "Proof files pinned"
    )
    .expect("register proof_uploads_total")
});

pub static UPSTREAM_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "dapptrack_upstream_errors_total",
        "Failed calls to Pinata or the Aptos indexer surfaced to clients"
    )
    .expect("register upstream_errors_total")
});

/// Touch every metric so `/metrics` lists them before the first event.
pub fn init_metrics() {
    Lazy::force(&REGISTRY_WRITES_TOTAL);
    Lazy::force(&REGISTRY_WRITE_FAILURES_TOTAL);
    Lazy::force(&PROOF_UPLOADS_TOTAL);
    Lazy::force(&UPSTREAM_ERRORS_TOTAL);
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
