use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use common::{aptos::AptosClient, http::build_client, pinata::PinataClient, utils::logging::init_logging_from_env};
use configs::AppConfig;
use dotenvy::dotenv;
use service::{chain::AptosEvents, registry::OrganizationRegistry};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::observability;
use crate::routes;
use crate::state::{AppState, ChainInfo};

pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the Pinata and Aptos clients and the organization registry from config.
pub fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    let http = build_client(
        Duration::from_secs(cfg.http.connect_timeout_secs),
        Duration::from_secs(cfg.http.request_timeout_secs),
    )?;

    let pinata = Arc::new(PinataClient::new(
        http.clone(),
        &cfg.pinning.api_url,
        &cfg.pinning.gateway,
        cfg.pinning.jwt.clone(),
    ));
    let events = Arc::new(AptosEvents::new(AptosClient::new(http, &cfg.chain.indexer_url), cfg.chain.event_limit));
    let registry = Arc::new(OrganizationRegistry::new(pinata.clone(), cfg.pinning.document_name.clone()));

    Ok(AppState {
        registry,
        pinata_configured: pinata.is_configured(),
        pinning: pinata,
        events,
        chain: ChainInfo {
            network: cfg.chain.network.clone(),
            module_address: cfg.chain.module_address.clone(),
        },
        max_upload_bytes: cfg.pinning.max_upload_bytes,
    })
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();
    observability::init_metrics();

    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let state = build_state(&cfg)?;
    if !state.pinata_configured {
        warn!("PINATA_JWT is not set; uploads and organization registration will fail");
    }
    if state.chain.module_address.is_none() {
        warn!("module address is not set; event routes will fail");
    }

    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, network = %cfg.chain.network, "starting dapptrack api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
