use async_trait::async_trait;
use common::aptos::AptosClient;
use serde_json::Value;
use tracing::debug;

use crate::errors::ServiceError;

/// The `dapptrack` Move module events exposed over HTTP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DappEvent {
    FundAllocated,
    DonationReceived,
}

impl DappEvent {
    pub fn struct_name(self) -> &'static str {
        match self {
            DappEvent::FundAllocated => "FundAllocated",
            DappEvent::DonationReceived => "DonationReceived",
        }
    }

    /// Fully qualified event type, e.g. `0xabc::dapptrack::FundAllocated`.
    pub fn event_type(self, module_address: &str) -> String {
        format!("{}::dapptrack::{}", module_address, self.struct_name())
    }
}

/// Read-only access to on-chain account events.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn account_events(&self, account: &str, event_type: &str) -> Result<Vec<Value>, ServiceError>;
}

/// `EventSource` over the Aptos indexer with a fixed page size.
#[derive(Clone)]
pub struct AptosEvents {
    client: AptosClient,
    limit: u32,
}

impl AptosEvents {
    pub fn new(client: AptosClient, limit: u32) -> Self {
        Self { client, limit }
    }
}

#[async_trait]
impl EventSource for AptosEvents {
    async fn account_events(&self, account: &str, event_type: &str) -> Result<Vec<Value>, ServiceError> {
        Ok(self.client.account_events(account, event_type, self.limit).await?)
    }
}

/// Query the module account's events of one kind. The module account is both
/// the account queried and the address qualifying the event type.
pub async fn module_events(
    source: &dyn EventSource,
    module_address: Option<&str>,
    event: DappEvent,
) -> Result<Vec<Value>, ServiceError> {
    let module = module_address.ok_or_else(|| ServiceError::not_configured("module address"))?;
    let event_type = event.event_type(module);
    let events = source.account_events(module, &event_type).await?;
    debug!(event_type = %event_type, count = events.len(), "queried module events");
    Ok(events)
}

/// In-memory event source for tests.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockEventSource {
        events: Mutex<HashMap<(String, String), Vec<Value>>>,
        failure: Mutex<Option<String>>,
        calls: Mutex<usize>,
    }

    impl MockEventSource {
        pub fn new() -> Self { Self::default() }

        pub fn push(&self, account: &str, event_type: &str, event: Value) {
            let mut events = self.events.lock().unwrap();
            events.entry((account.to_string(), event_type.to_string())).or_default().push(event);
        }

        pub fn fail_with(&self, message: &str) {
            *self.failure.lock().unwrap() = Some(message.to_string());
        }

        pub fn calls(&self) -> usize { *self.calls.lock().unwrap() }
    }

    #[async_trait]
    impl EventSource for MockEventSource {
        async fn account_events(&self, account: &str, event_type: &str) -> Result<Vec<Value>, ServiceError> {
            *self.calls.lock().unwrap() += 1;
            if let Some(msg) = self.failure.lock().unwrap().clone() {
                return Err(ServiceError::Upstream(msg));
            }
            let events = self.events.lock().unwrap();
            Ok(events.get(&(account.to_string(), event_type.to_string())).cloned().unwrap_or_default())
        }
    }
}
