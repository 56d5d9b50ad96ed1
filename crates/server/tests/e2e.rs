use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use server::routes;
use server::state::{AppState, ChainInfo};
use service::chain::mock::MockEventSource;
use service::pinning::mock::MockPinningService;
use service::registry::OrganizationRegistry;

const DOC: &str = "dapptrack-organizations.json";
const MODULE: &str = "0xfeed";

fn cors() -> CorsLayer { CorsLayer::very_permissive() }

struct TestApp {
    base_url: String,
    pinning: Arc<MockPinningService>,
    events: Arc<MockEventSource>,
}

struct Options {
    module_address: Option<&'static str>,
    max_upload_bytes: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self { module_address: Some(MODULE), max_upload_bytes: 10 * 1024 * 1024 }
    }
}

async fn start_server_with(pinning: Arc<MockPinningService>, opts: Options) -> anyhow::Result<TestApp> {
    let events = Arc::new(MockEventSource::new());
    let state = AppState {
        registry: Arc::new(OrganizationRegistry::new(pinning.clone(), DOC)),
        pinning: pinning.clone(),
        events: events.clone(),
        chain: ChainInfo { network: "testnet".into(), module_address: opts.module_address.map(String::from) },
        pinata_configured: true,
        max_upload_bytes: opts.max_upload_bytes,
    };

    let app: Router = routes::build_router(state, cors());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, pinning, events })
}

async fn start_server() -> anyhow::Result<TestApp> {
    start_server_with(Arc::new(MockPinningService::new()), Options::default()).await
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

#[tokio::test]
async fn e2e_health_reports_configuration() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["network"], "testnet");
    assert_eq!(body["moduleAddress"], MODULE);
    assert_eq!(body["pinataConfigured"], true);
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    Ok(())
}

#[tokio::test]
async fn e2e_organizations_start_empty() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/organizations", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["organizations"], json!([]));
    assert!(body["ipfsHash"].is_null());
    assert_eq!(body["count"], 0);
    Ok(())
}

#[tokio::test]
async fn e2e_register_then_list() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.post(format!("{}/organizations", app.base_url))
        .json(&json!({"name": "Clean Water", "description": "wells", "trustScore": 99}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let created = res.json::<serde_json::Value>().await?;
    assert_eq!(created["success"], true);
    assert_eq!(created["organization"]["name"], "Clean Water");
    assert_eq!(created["organization"]["trustScore"], 50);
    assert_eq!(created["organization"]["verified"], false);
    let cid = created["ipfsHash"].as_str().unwrap().to_string();

    let res = c.post(format!("{}/organizations", app.base_url))
        .json(&json!({"name": "Food Bank"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let second = res.json::<serde_json::Value>().await?;
    assert_ne!(second["ipfsHash"].as_str().unwrap(), cid);

    let body = c.get(format!("{}/organizations", app.base_url)).send().await?.json::<serde_json::Value>().await?;
    assert_eq!(body["count"], 2);
    assert_eq!(body["organizations"][0]["name"], "Clean Water");
    assert_eq!(body["organizations"][1]["name"], "Food Bank");
    assert_eq!(body["ipfsHash"], second["ipfsHash"]);

    let persisted = app.pinning.content(second["ipfsHash"].as_str().unwrap()).unwrap();
    assert_eq!(persisted.as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn e2e_register_without_body_uses_only_derived_fields() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().post(format!("{}/organizations", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    let org = body["organization"].as_object().unwrap();
    let mut keys: Vec<&str> = org.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["activeFunds", "beneficiaries", "completedProjects", "id", "registeredAt", "reviews", "totalDonations", "trustScore", "verified"]
    );
    Ok(())
}

#[tokio::test]
async fn e2e_register_rejects_non_object_payload() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().post(format!("{}/organizations", app.base_url))
        .header("content-type", "application/json")
        .body("[1, 2, 3]")
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "Invalid organization payload");
    assert_eq!(app.pinning.json_uploads(), 0);
    Ok(())
}

#[tokio::test]
async fn e2e_register_upload_failure_is_server_error() -> anyhow::Result<()> {
    let app = start_server().await?;
    app.pinning.fail_upload(true);
    let res = client().post(format!("{}/organizations", app.base_url))
        .json(&json!({"name": "Unlucky"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "Registration failed");
    assert!(body["details"].as_str().unwrap().contains("mock upload rejected"));

    let list = client().get(format!("{}/organizations", app.base_url)).send().await?.json::<serde_json::Value>().await?;
    assert_eq!(list["count"], 0);
    Ok(())
}

#[tokio::test]
async fn e2e_existing_document_is_served_after_cold_start() -> anyhow::Result<()> {
    let pinning = Arc::new(MockPinningService::new());
    let cid = pinning.seed_json(DOC, json!([
        {"id": "1700000000000", "registeredAt": "2023-11-14T22:13:20.000Z", "name": "Seeded"}
    ]));
    let app = start_server_with(pinning, Options::default()).await?;

    let body = client().get(format!("{}/organizations", app.base_url)).send().await?.json::<serde_json::Value>().await?;
    assert_eq!(body["count"], 1);
    assert_eq!(body["ipfsHash"], cid);
    assert_eq!(body["organizations"][0]["name"], "Seeded");
    assert_eq!(body["organizations"][0]["trustScore"], 50);
    Ok(())
}

#[tokio::test]
async fn e2e_upload_proof_without_photo_is_client_error() -> anyhow::Result<()> {
    let app = start_server().await?;
    let form = Form::new().text("note", "no photo here");
    let res = client().post(format!("{}/upload-proof", app.base_url)).multipart(form).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "No file uploaded");
    assert_eq!(app.pinning.file_uploads(), 0);

    // not multipart at all
    let res = client().post(format!("{}/upload-proof", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(app.pinning.file_uploads(), 0);
    Ok(())
}

#[tokio::test]
async fn e2e_upload_proof_pins_photo() -> anyhow::Result<()> {
    let app = start_server().await?;
    let part = Part::bytes(vec![7u8; 2048]).file_name("delivery.png").mime_str("image/png")?;
    let form = Form::new().text("fundId", "42").part("photo", part);
    let res = client().post(format!("{}/upload-proof", app.base_url)).multipart(form).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["fileName"], "delivery.png");
    assert_eq!(body["size"], 2048);
    assert!(body["ipfsHash"].as_str().unwrap().starts_with("bafymock"));
    assert!(body["timestamp"].is_string());
    assert_eq!(app.pinning.file_uploads(), 1);
    Ok(())
}

#[tokio::test]
async fn e2e_upload_proof_over_limit_is_rejected() -> anyhow::Result<()> {
    let app = start_server_with(
        Arc::new(MockPinningService::new()),
        Options { max_upload_bytes: 1024, ..Options::default() },
    ).await?;
    let part = Part::bytes(vec![1u8; 4096]).file_name("big.jpg");
    let form = Form::new().part("photo", part);
    let res = client().post(format!("{}/upload-proof", app.base_url)).multipart(form).send().await?;
    assert_eq!(res.status(), HttpStatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.pinning.file_uploads(), 0);
    Ok(())
}

#[tokio::test]
async fn e2e_events_are_passed_through() -> anyhow::Result<()> {
    let app = start_server().await?;
    app.events.push(MODULE, &format!("{MODULE}::dapptrack::FundAllocated"), json!({"data": {"fund_id": "1", "amount": "500"}}));
    app.events.push(MODULE, &format!("{MODULE}::dapptrack::DonationReceived"), json!({"data": {"donor": "0x1", "amount": "20"}}));
    app.events.push(MODULE, &format!("{MODULE}::dapptrack::DonationReceived"), json!({"data": {"donor": "0x2", "amount": "30"}}));

    let funds = client().get(format!("{}/events/funds", app.base_url)).send().await?.json::<serde_json::Value>().await?;
    assert_eq!(funds["events"].as_array().unwrap().len(), 1);
    assert_eq!(funds["events"][0]["data"]["amount"], "500");

    let donations = client().get(format!("{}/events/donations", app.base_url)).send().await?.json::<serde_json::Value>().await?;
    assert_eq!(donations["events"].as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn e2e_event_query_failure_is_server_error() -> anyhow::Result<()> {
    let app = start_server().await?;
    app.events.fail_with("indexer unavailable");
    let res = client().get(format!("{}/events/donations", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "Failed to query donations");
    assert!(body["details"].as_str().unwrap().contains("indexer unavailable"));
    Ok(())
}

#[tokio::test]
async fn e2e_events_without_module_address_fail() -> anyhow::Result<()> {
    let app = start_server_with(
        Arc::new(MockPinningService::new()),
        Options { module_address: None, ..Options::default() },
    ).await?;
    let res = client().get(format!("{}/events/funds", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "Failed to query funds");
    assert_eq!(app.events.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn e2e_metrics_exposed() -> anyhow::Result<()> {
    let app = start_server().await?;
    client().post(format!("{}/organizations", app.base_url)).json(&json!({"name": "m"})).send().await?;
    let res = client().get(format!("{}/metrics", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let text = res.text().await?;
    assert!(text.contains("dapptrack_registry_writes_total"));
    Ok(())
}
