use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use crate::observability;
use crate::state::AppState;

pub mod events;
pub mod health;
pub mod organizations;
pub mod proofs;

// room for multipart boundaries and headers around the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the full application router.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let upload_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);

    let uploads = Router::new()
        .route("/upload-proof", post(proofs::upload_proof))
        .layer(DefaultBodyLimit::max(upload_limit));

    let api = Router::new()
        .route("/events/funds", get(events::funds))
        .route("/events/donations", get(events::donations))
        .route(
            "/organizations",
            get(organizations::list_organizations).post(organizations::register_organization),
        )
        .route("/health", get(health::health))
        .route("/metrics", get(|| async { observability::encode_metrics() }));

    uploads
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx responses are logged at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
