//! Credential session
//!
//! The session is an explicit object handed to every request, not a process
//! global. It holds at most one verified credential pair.

use crate::error::{GatewayError, Result};
use crate::provider::{AccountSummary, CredentialVerifier};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Identity (account email) and secret (API key) used for header auth
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    identity: String,
    secret: String,
}

impl Credentials {
    /// Build a pair; both halves must be non-empty
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        let identity = identity.into().trim().to_string();
        let secret = secret.into().trim().to_string();

        if identity.is_empty() || secret.is_empty() {
            return Err(GatewayError::unauthenticated(
                "Both identity and secret are required",
            ));
        }

        Ok(Self { identity, secret })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Holder of the active credential pair
#[derive(Debug, Default)]
pub struct Session {
    current: RwLock<Option<Credentials>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pair that has not been verified (e.g. from the environment)
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            current: RwLock::new(Some(credentials)),
        }
    }

    pub fn get(&self) -> Option<Credentials> {
        self.read().clone()
    }

    /// Current pair, or `Unauthenticated` before any upstream call is attempted
    pub fn require(&self) -> Result<Credentials> {
        self.get().ok_or_else(|| {
            GatewayError::unauthenticated("Not authenticated. Please set credentials first")
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    pub fn clear(&self) {
        *self.write() = None;
    }

    /// Verify a pair against the provider and store it.
    ///
    /// On any verification failure the session ends up empty, never holding
    /// the previous pair or half of the new one.
    pub async fn set_credentials<V>(
        &self,
        verifier: &V,
        identity: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<AccountSummary>
    where
        V: CredentialVerifier + ?Sized,
    {
        let candidate = match Credentials::new(identity, secret) {
            Ok(candidate) => candidate,
            Err(err) => {
                self.clear();
                return Err(err);
            }
        };

        match verifier.verify(&candidate).await {
            Ok(account) => {
                tracing::info!(identity = %candidate.identity(), "Credentials verified");
                *self.write() = Some(candidate);
                Ok(account)
            }
            Err(err) => {
                tracing::warn!(identity = %candidate.identity(), error = %err, "Credential verification failed");
                self.clear();
                Err(match err {
                    GatewayError::Upstream { message, .. }
                    | GatewayError::NotFound(message)
                    | GatewayError::CommandFailed(message) => GatewayError::Unauthenticated(message),
                    other => other,
                })
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Credentials>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Credentials>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}
