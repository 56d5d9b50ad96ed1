use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: String,
    pub network: String,
    pub module_address: Option<String>,
    pub pinata_configured: bool,
    pub timestamp: String,
}
