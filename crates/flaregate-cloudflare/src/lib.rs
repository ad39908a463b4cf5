//! Cloudflare backends for Flaregate
//!
//! This crate maps the gateway's internal operations onto Cloudflare and
//! provides the two interchangeable backends behind the [`Gateway`] trait.
//!
//! # Features
//!
//! - Operation table: one upstream call shape per internal route
//! - Direct API backend (`X-Auth-Email` / `X-Auth-Key` header auth)
//! - Command-line backend (`cfm`, credentials via environment)
//! - Uncached account id resolution for account-scoped calls
//!
//! # Example
//!
//! ```ignore
//! use flaregate_cloud::{Credentials, Session};
//! use flaregate_cloudflare::{ApiExecutor, ApiGateway, Gateway, Operation};
//!
//! let gateway = ApiGateway::new(ApiExecutor::default());
//! let session = Session::new();
//!
//! session.set_credentials(&gateway, "ops@example.com", "global-api-key").await?;
//! let creds = session.require()?;
//!
//! let reply = gateway.dispatch(&creds, Operation::ListZones).await?;
//! println!("{}", reply.to_envelope());
//! ```

pub mod api;
pub mod cli;
pub mod model;
pub mod operation;
pub mod provider;
pub mod resolver;

pub use api::{ApiExecutor, CLOUDFLARE_API_BASE};
pub use cli::{CliExecutor, CliGateway, CliOutput, DEFAULT_CLI_PROGRAM, DEFAULT_CLI_TIMEOUT};
pub use model::{
    BucketInput, DnsRecordInput, DnsRecordType, KvNamespaceInput, KvPair, PagesDeploymentUpload,
    PagesProjectInput, PurgeInput, WorkerRouteInput, WorkerScript, ZoneInput,
};
pub use operation::Operation;
pub use provider::{ApiGateway, Gateway};
pub use resolver::{first_account, resolve_account_id};
