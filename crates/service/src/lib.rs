//! Service layer for the DappTrack API.
//! - `registry`: the organization registry cached in memory and persisted on IPFS.
//! - `pinning` / `chain`: ports over the Pinata and Aptos clients, with in-memory mocks.
//! - `proofs`: proof-photo uploads.

pub mod chain;
pub mod errors;
pub mod pinning;
pub mod proofs;
pub mod registry;
