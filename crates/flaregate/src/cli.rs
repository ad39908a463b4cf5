//! Command-line flags
//!
//! Precedence: flag, then environment variable, then config file, then the
//! built-in default.

use clap::Parser;
use flaregate_cloud::Credentials;
use flaregate_config::{BackendKind, FileConfig, Settings};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "flaregate")]
#[command(about = "REST gateway for managing Cloudflare zones, DNS, Workers, Pages, KV and R2", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Address to bind
    #[arg(long, env = "FLAREGATE_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "FLAREGATE_PORT")]
    pub port: Option<u16>,

    /// Backend talking to Cloudflare (api, cli)
    #[arg(short, long, env = "FLAREGATE_BACKEND")]
    pub backend: Option<BackendKind>,

    /// Cloudflare API base URL
    #[arg(long, env = "FLAREGATE_API_BASE")]
    pub api_base: Option<String>,

    /// Path of the cfm command-line tool
    #[arg(long, env = "FLAREGATE_CLI_PATH")]
    pub cli_path: Option<PathBuf>,

    /// Seconds before a cfm invocation is killed
    #[arg(long, env = "FLAREGATE_CLI_TIMEOUT")]
    pub cli_timeout: Option<u64>,

    /// Directory for staged worker scripts
    #[arg(long, env = "FLAREGATE_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Config file (defaults to FLAREGATE_CONFIG, then ./flaregate.local.yaml,
    /// ./flaregate.yaml, ~/.config/flaregate/config.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Account email used until credentials are set through the API
    #[arg(long, env = "CLOUDFLARE_EMAIL", hide_env_values = true)]
    pub email: Option<String>,

    /// Global API key used until credentials are set through the API
    #[arg(long, env = "CLOUDFLARE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl Cli {
    /// Flag and environment values, shaped as a config layer
    pub fn overrides(&self) -> FileConfig {
        FileConfig {
            host: self.host.clone(),
            port: self.port,
            backend: self.backend,
            api_base: self.api_base.clone(),
            cli_path: self.cli_path.clone(),
            cli_timeout: self.cli_timeout,
            scratch_dir: self.scratch_dir.clone(),
        }
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings = flaregate_config::load(self.config.as_deref())?;
        Ok(settings.apply(self.overrides()))
    }

    /// Pre-populated credentials; stored without verification
    pub fn initial_credentials(&self) -> Option<Credentials> {
        match (&self.email, &self.api_key) {
            (Some(email), Some(key)) => Credentials::new(email.as_str(), key.as_str()).ok(),
            (None, None) => None,
            _ => {
                tracing::warn!(
                    "Only one of CLOUDFLARE_EMAIL / CLOUDFLARE_API_KEY is set; starting unauthenticated"
                );
                None
            }
        }
    }
}
