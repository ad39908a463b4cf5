//! Credential verification contract

use crate::error::Result;
use crate::session::Credentials;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Account information returned by a successful verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountSummary(pub Value);

impl AccountSummary {
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }
}

/// Checks a credential pair against the provider.
///
/// Both backends implement this; the session only stores a pair after it
/// passes.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, credentials: &Credentials) -> Result<AccountSummary>;
}
