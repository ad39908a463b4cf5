//! Flaregate gateway contract
//!
//! This crate holds everything the gateway needs that does not depend on which
//! backend talks to the provider: the credential session, the shape of a
//! single upstream call, the executor trait, and the normalizer that turns raw
//! provider responses into one result/error contract.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                flaregate (axum)                 │
//! │         inbound route -> Operation              │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               flaregate-cloud                   │
//! │  ┌────────────┐ ┌──────────────┐ ┌───────────┐  │
//! │  │  Session   │ │ UpstreamCall │ │ normalize │  │
//! │  └────────────┘ └──────────────┘ └───────────┘  │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │  api backend  │ │  cli backend  │
//! │   (reqwest)   │ │ (tokio proc)  │
//! └───────────────┘ └───────────────┘
//! ```

pub mod call;
pub mod error;
pub mod executor;
pub mod normalize;
pub mod provider;
pub mod session;

// Re-exports
pub use call::{CallBody, Encoding, FormPart, HttpMethod, UpstreamCall};
pub use error::{GatewayError, Result};
pub use executor::{RawResponse, UpstreamExecutor};
pub use normalize::{KEY_NOT_FOUND, NormalizedResult, Reply, ResponseMode, UNKNOWN_ERROR, normalize};
pub use provider::{AccountSummary, CredentialVerifier};
pub use session::{Credentials, Session};
