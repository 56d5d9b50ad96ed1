//! Organization registry persisted as `dapptrack-organizations.json` on IPFS.

pub mod domain;
pub mod service;

pub use domain::{OrganizationRecord, Registration, RegistrySnapshot, RegistryStatus};
pub use service::OrganizationRegistry;
