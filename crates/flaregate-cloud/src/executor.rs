//! Upstream call executor trait

use crate::call::UpstreamCall;
use crate::error::Result;
use crate::session::Credentials;
use async_trait::async_trait;

/// Status and body of one provider response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs exactly one outbound call.
///
/// Transport failures come back as `Err`; any HTTP status, including 4xx and
/// 5xx, comes back as `Ok` so the normalizer can decide what it means.
/// Implementations never retry.
#[async_trait]
pub trait UpstreamExecutor: Send + Sync {
    async fn execute(&self, credentials: &Credentials, call: &UpstreamCall) -> Result<RawResponse>;
}
