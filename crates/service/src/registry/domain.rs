use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_TRUST_SCORE: i64 = 50;

/// Field names the registry assigns itself; caller input never overrides them.
pub const DERIVED_FIELDS: [&str; 9] = [
    "id",
    "registeredAt",
    "trustScore",
    "totalDonations",
    "activeFunds",
    "completedProjects",
    "beneficiaries",
    "verified",
    "reviews",
];

fn default_trust_score() -> i64 { DEFAULT_TRUST_SCORE }

/// A registered organization: registry-assigned fields plus whatever the
/// caller sent (name, description, wallet, ...), kept verbatim.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRecord {
    pub id: String,
    pub registered_at: String,
    #[serde(default = "default_trust_score")]
    pub trust_score: i64,
    #[serde(default)]
    pub total_donations: i64,
    #[serde(default)]
    pub active_funds: i64,
    #[serde(default)]
    pub completed_projects: i64,
    #[serde(default)]
    pub beneficiaries: i64,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub reviews: Vec<Value>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl OrganizationRecord {
    /// Fresh record with creation defaults. Caller keys that collide with
    /// `DERIVED_FIELDS` are dropped.
    pub fn new(id: String, registered_at: String, mut fields: Map<String, Value>) -> Self {
        for key in DERIVED_FIELDS {
            fields.remove(key);
        }
        Self {
            id,
            registered_at,
            trust_score: DEFAULT_TRUST_SCORE,
            total_donations: 0,
            active_funds: 0,
            completed_projects: 0,
            beneficiaries: 0,
            verified: false,
            reviews: Vec::new(),
            fields,
        }
    }
}

/// What `GET /organizations` returns.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    pub organizations: Vec<OrganizationRecord>,
    pub ipfs_hash: Option<String>,
    pub count: usize,
}

/// Outcome of a successful registration.
#[derive(Clone, Debug, PartialEq)]
pub struct Registration {
    pub organization: OrganizationRecord,
    pub ipfs_hash: String,
}

/// Load progress of the registry, distinguishing "never loaded" from
/// "loaded and empty".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryStatus {
    NotLoaded,
    LoadedEmpty,
    LoadedNonEmpty,
}
