use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

pub const DEFAULT_DOCUMENT_NAME: &str = "dapptrack-organizations.json";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub pinning: PinningConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080 }
    }
}

/// Aptos network the event routes read from.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default = "default_indexer_url")]
    pub indexer_url: String,
    #[serde(default)]
    pub module_address: Option<String>,
    #[serde(default = "default_event_limit")]
    pub event_limit: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            indexer_url: default_indexer_url(),
            module_address: None,
            event_limit: default_event_limit(),
        }
    }
}

/// Pinata credentials and the registry document's logical name.
#[derive(Debug, Clone, Deserialize)]
pub struct PinningConfig {
    #[serde(default = "default_pinata_api")]
    pub api_url: String,
    #[serde(default = "default_gateway")]
    pub gateway: String,
    #[serde(default)]
    pub jwt: Option<String>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_document_name")]
    pub document_name: String,
}

impl Default for PinningConfig {
    fn default() -> Self {
        Self {
            api_url: default_pinata_api(),
            gateway: default_gateway(),
            jwt: None,
            max_upload_bytes: default_max_upload_bytes(),
            document_name: default_document_name(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_network() -> String { "testnet".into() }
fn default_indexer_url() -> String { "https://api.testnet.aptoslabs.com/v1/graphql".into() }
fn default_event_limit() -> u32 { 100 }
fn default_pinata_api() -> String { "https://api.pinata.cloud".into() }
fn default_gateway() -> String { "gateway.pinata.cloud".into() }
fn default_max_upload_bytes() -> usize { DEFAULT_MAX_UPLOAD_BYTES }
fn default_document_name() -> String { DEFAULT_DOCUMENT_NAME.into() }
fn default_connect_timeout() -> u64 { 5 }
fn default_request_timeout() -> u64 { 30 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` when present, otherwise start from defaults with
    /// `SERVER_HOST`/`SERVER_PORT`; then apply secrets from the environment.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(_) => {
                let mut cfg = AppConfig::default();
                cfg.server.apply_env(|k| std::env::var(k).ok());
                cfg
            }
        };
        cfg.normalize_and_validate_with(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    pub fn normalize_and_validate_with<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.server.normalize()?;
        self.chain.normalize_from_env(&env);
        self.chain.validate()?;
        self.pinning.normalize_from_env(&env);
        self.pinning.validate()?;
        self.http.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = env("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = env("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        Ok(())
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn is_http_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl ChainConfig {
    /// The module address may come from `MODULE_ADDRESS` or the frontend's
    /// `VITE_MODULE_PUBLISHER_ACCOUNT_ADDRESS`; the TOML value wins when set.
    pub fn normalize_from_env<F>(&mut self, env: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.module_address = non_empty(self.module_address.take())
            .or_else(|| non_empty(env("MODULE_ADDRESS")))
            .or_else(|| non_empty(env("VITE_MODULE_PUBLISHER_ACCOUNT_ADDRESS")));
    }

    pub fn validate(&self) -> Result<()> {
        if !is_http_url(&self.indexer_url) {
            return Err(anyhow!("chain.indexer_url must start with http:// or https://"));
        }
        if self.event_limit == 0 {
            return Err(anyhow!("chain.event_limit must be >= 1"));
        }
        Ok(())
    }
}

impl PinningConfig {
    pub fn normalize_from_env<F>(&mut self, env: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.jwt = non_empty(self.jwt.take()).or_else(|| non_empty(env("PINATA_JWT")));
    }

    pub fn validate(&self) -> Result<()> {
        if !is_http_url(&self.api_url) {
            return Err(anyhow!("pinning.api_url must start with http:// or https://"));
        }
        if self.gateway.trim().is_empty() {
            return Err(anyhow!("pinning.gateway is empty"));
        }
        if self.max_upload_bytes == 0 {
            return Err(anyhow!("pinning.max_upload_bytes must be > 0"));
        }
        if self.document_name.trim().is_empty() {
            return Err(anyhow!("pinning.document_name is empty"));
        }
        Ok(())
    }
}

impl HttpConfig {
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(anyhow!("http timeouts must be positive seconds"));
        }
        Ok(())
    }
}
