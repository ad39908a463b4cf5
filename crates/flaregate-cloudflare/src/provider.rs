//! Gateway backends
//!
//! A [`Gateway`] turns one [`Operation`] into exactly one provider interaction
//! (plus the account lookup when the operation needs it) and hands back a
//! normalized [`Reply`]. Handlers are written once against this trait; the
//! direct API backend and the command-line backend both implement it.

use crate::api::ApiExecutor;
use crate::operation::Operation;
use crate::resolver::{first_account, resolve_account_id};
use async_trait::async_trait;
use flaregate_cloud::{
    AccountSummary, CredentialVerifier, Credentials, Reply, Result, UpstreamExecutor, normalize,
};

#[async_trait]
pub trait Gateway: CredentialVerifier {
    /// Backend identifier (`"api"` or `"cli"`)
    fn backend(&self) -> &'static str;

    /// Run one operation with the given credentials
    async fn dispatch(&self, credentials: &Credentials, operation: Operation) -> Result<Reply>;
}

/// Gateway backed by the provider's HTTP API
#[derive(Debug, Clone)]
pub struct ApiGateway<E = ApiExecutor> {
    executor: E,
}

impl<E> ApiGateway<E>
where
    E: UpstreamExecutor,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

#[async_trait]
impl<E> CredentialVerifier for ApiGateway<E>
where
    E: UpstreamExecutor,
{
    async fn verify(&self, credentials: &Credentials) -> Result<AccountSummary> {
        first_account(&self.executor, credentials).await
    }
}

#[async_trait]
impl<E> Gateway for ApiGateway<E>
where
    E: UpstreamExecutor,
{
    fn backend(&self) -> &'static str {
        "api"
    }

    async fn dispatch(&self, credentials: &Credentials, operation: Operation) -> Result<Reply> {
        let account_id = if operation.needs_account_id() {
            Some(resolve_account_id(&self.executor, credentials).await?)
        } else {
            None
        };

        let call = operation.http_call(account_id.as_deref())?;
        let raw = self.executor.execute(credentials, &call).await?;
        let status = raw.status;

        let reply = normalize(raw, operation.response_mode()).into_reply();
        if let Err(err) = &reply {
            tracing::warn!(operation = operation.name(), status, error = %err, "Upstream call failed");
        }
        reply
    }
}
