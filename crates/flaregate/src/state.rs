//! Shared application state

use flaregate_cloud::Session;
use flaregate_cloudflare::Gateway;
use std::sync::Arc;

/// Handed to every handler: the configured backend and the shared session
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn Gateway>,
    pub session: Arc<Session>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn Gateway>, session: Arc<Session>) -> Self {
        Self { gateway, session }
    }

    pub fn backend(&self) -> &'static str {
        self.gateway.backend()
    }
}
