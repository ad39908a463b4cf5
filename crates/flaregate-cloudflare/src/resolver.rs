//! Account id resolution
//!
//! Account-scoped paths need an account id, which callers never send. It is
//! looked up on every request by listing accounts and taking the first one.
//! Nothing is cached: two account-scoped requests cost two account listings.

use crate::operation::ACCOUNTS_PATH;
use flaregate_cloud::{
    AccountSummary, Credentials, GatewayError, NormalizedResult, ResponseMode, Result,
    UpstreamCall, UpstreamExecutor, normalize,
};
use serde_json::Value;

pub const NO_ACCOUNTS: &str = "No accounts found";

/// List accounts and return the first one
pub async fn first_account<E>(executor: &E, credentials: &Credentials) -> Result<AccountSummary>
where
    E: UpstreamExecutor + ?Sized,
{
    let raw = executor
        .execute(credentials, &UpstreamCall::get(ACCOUNTS_PATH))
        .await?;

    match normalize(raw, ResponseMode::Structured) {
        NormalizedResult::Success { payload } => first_entry(&payload)
            .cloned()
            .map(AccountSummary)
            .ok_or_else(|| GatewayError::NotFound(NO_ACCOUNTS.to_string())),
        NormalizedResult::Failure { status, message } => Err(GatewayError::upstream(status, message)),
        NormalizedResult::RawSuccess { .. } => Err(GatewayError::NotFound(NO_ACCOUNTS.to_string())),
    }
}

/// Id of the first account the credentials can see
pub async fn resolve_account_id<E>(executor: &E, credentials: &Credentials) -> Result<String>
where
    E: UpstreamExecutor + ?Sized,
{
    let account = first_account(executor, credentials).await?;
    let id = account
        .id()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| GatewayError::NotFound(NO_ACCOUNTS.to_string()))?;
    tracing::debug!(account_id = %id, "Resolved account");
    Ok(id.to_string())
}

/// First element of an account listing, enveloped (`{"result": [...]}`) or bare
fn first_entry(payload: &Value) -> Option<&Value> {
    payload
        .get("result")
        .unwrap_or(payload)
        .as_array()
        .and_then(|accounts| accounts.first())
}
