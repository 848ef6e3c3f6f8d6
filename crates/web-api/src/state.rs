use std::sync::Arc;

use application::{MessageLedger, PresenceRegistry};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<PresenceRegistry>,
    pub ledger: Arc<MessageLedger>,
}

impl AppState {
    pub fn new(registry: Arc<PresenceRegistry>, ledger: Arc<MessageLedger>) -> Self {
        Self { registry, ledger }
    }
}
