//! Flaregate
//!
//! REST gateway in front of Cloudflare. Every inbound route maps onto exactly
//! one [`flaregate_cloudflare::Operation`], run by whichever backend was
//! configured at startup.

pub mod cli;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;

use flaregate_cloudflare::{ApiExecutor, ApiGateway, CliExecutor, CliGateway, Gateway};
use flaregate_config::{BackendKind, Settings};
use std::sync::Arc;
use std::time::Duration;

/// Build the backend selected in `settings`
pub fn build_gateway(settings: &Settings) -> Arc<dyn Gateway> {
    match settings.backend {
        BackendKind::Api => Arc::new(ApiGateway::new(ApiExecutor::new(settings.api_base.clone()))),
        BackendKind::Cli => {
            let executor = CliExecutor::new(
                settings.cli_path.clone(),
                Duration::from_secs(settings.cli_timeout_secs),
            );
            let gateway = match &settings.scratch_dir {
                Some(dir) => CliGateway::with_scratch_dir(executor, dir.clone()),
                None => CliGateway::new(executor),
            };
            Arc::new(gateway)
        }
    }
}
