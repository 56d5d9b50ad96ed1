//! Minimal Pinata REST client
//!
//! Covers the four calls the service needs: listing pins by metadata name,
//! reading a CID through the dedicated gateway, pinning a JSON document and
//! pinning a single file. Authentication is a JWT bearer token.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::ensure_success;
use crate::CoreError;

/// Response of `pinFileToIPFS` / `pinJSONToIPFS`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PinResponse {
    #[serde(rename = "IpfsHash")]
    pub ipfs_hash: String,
    #[serde(rename = "PinSize", default)]
    pub pin_size: u64,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PinListResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub rows: Vec<PinListRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PinListRow {
    pub ipfs_pin_hash: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub date_pinned: Option<String>,
    #[serde(default)]
    pub metadata: PinMetadata,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PinMetadata {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct PinataClient {
    http: reqwest::Client,
    api_url: String,
    gateway: String,
    jwt: Option<String>,
}

impl PinataClient {
    pub fn new(http: reqwest::Client, api_url: impl Into<String>, gateway: impl Into<String>, jwt: Option<String>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            gateway: gateway.into(),
            jwt,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.jwt.as_deref().is_some_and(|j| !j.trim().is_empty())
    }

    fn bearer(&self) -> Result<&str, CoreError> {
        match self.jwt.as_deref() {
            Some(j) if !j.trim().is_empty() => Ok(j),
            _ => Err(CoreError::Config("PINATA_JWT is not set".into())),
        }
    }

    fn gateway_url(&self, cid: &str) -> String {
        if self.gateway.starts_with("http://") || self.gateway.starts_with("https://") {
            format!("{}/ipfs/{cid}", self.gateway.trim_end_matches('/'))
        } else {
            format!("https://{}/ipfs/{cid}", self.gateway)
        }
    }

    /// List pinned files whose metadata name equals `name`.
    pub async fn pin_list(&self, name: &str) -> Result<PinListResponse, CoreError> {
        let url = format!("{}/data/pinList", self.api_url);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(self.bearer()?)
            .query(&[("status", "pinned"), ("metadata[name]", name)])
            .send()
            .await
            .map_err(CoreError::network)?;
        let resp = ensure_success(resp).await?;
        resp.json::<PinListResponse>().await.map_err(CoreError::parse)
    }

    /// Fetch and parse the JSON content stored under `cid`.
    pub async fn gateway_json(&self, cid: &str) -> Result<Value, CoreError> {
        let resp = self
            .http
            .get(self.gateway_url(cid))
            .send()
            .await
            .map_err(CoreError::network)?;
        let resp = ensure_success(resp).await?;
        resp.json::<Value>().await.map_err(CoreError::parse)
    }

    pub async fn pin_json(&self, name: &str, content: &Value) -> Result<PinResponse, CoreError> {
        let url = format!("{}/pinning/pinJSONToIPFS", self.api_url);
        let body = serde_json::json!({
            "pinataContent": content,
            "pinataMetadata": { "name": name },
        });
        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.bearer()?)
            .json(&body)
            .send()
            .await
            .map_err(CoreError::network)?;
        let resp = ensure_success(resp).await?;
        resp.json::<PinResponse>().await.map_err(CoreError::parse)
    }

    pub async fn pin_file(&self, file_name: &str, content_type: Option<&str>, bytes: Vec<u8>) -> Result<PinResponse, CoreError> {
        let url = format!("{}/pinning/pinFileToIPFS", self.api_url);
        let mut part = Part::bytes(bytes).file_name(file_name.to_string());
        if let Some(ct) = content_type {
            part = part.mime_str(ct).map_err(CoreError::parse)?;
        }
        let metadata = serde_json::json!({ "name": file_name }).to_string();
        let form = Form::new().part("file", part).text("pinataMetadata", metadata);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.bearer()?)
            .multipart(form)
            .send()
            .await
            .map_err(CoreError::network)?;
        let resp = ensure_success(resp).await?;
        resp.json::<PinResponse>().await.map_err(CoreError::parse)
    }
}
