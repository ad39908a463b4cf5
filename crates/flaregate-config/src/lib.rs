pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_CLI_PATH: &str = "cfm";
pub const DEFAULT_CLI_TIMEOUT_SECS: u64 = 30;

/// Environment variable naming a config file directly
pub const CONFIG_PATH_ENV: &str = "FLAREGATE_CONFIG";

/// Which backend talks to the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Direct HTTP calls with header credentials
    #[default]
    Api,
    /// The provider's command-line tool
    Cli,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Api => "api",
            BackendKind::Cli => "cli",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" | "http" => Ok(BackendKind::Api),
            "cli" => Ok(BackendKind::Cli),
            other => Err(ConfigError::InvalidBackend(other.to_string())),
        }
    }
}

/// Settings as written in a YAML file; every key optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub backend: Option<BackendKind>,
    pub api_base: Option<String>,
    pub cli_path: Option<PathBuf>,
    pub cli_timeout: Option<u64>,
    pub scratch_dir: Option<PathBuf>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub backend: BackendKind,
    pub api_base: String,
    pub cli_path: PathBuf,
    pub cli_timeout_secs: u64,
    /// Where staged worker scripts go; OS temp dir when unset
    pub scratch_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            backend: BackendKind::default(),
            api_base: DEFAULT_API_BASE.to_string(),
            cli_path: PathBuf::from(DEFAULT_CLI_PATH),
            cli_timeout_secs: DEFAULT_CLI_TIMEOUT_SECS,
            scratch_dir: None,
        }
    }
}

impl Settings {
    /// Layer `overrides` on top; only keys that are set replace current values
    pub fn apply(mut self, overrides: FileConfig) -> Self {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if let Some(api_base) = overrides.api_base {
            self.api_base = api_base;
        }
        if let Some(cli_path) = overrides.cli_path {
            self.cli_path = cli_path;
        }
        if let Some(cli_timeout) = overrides.cli_timeout {
            self.cli_timeout_secs = cli_timeout;
        }
        if overrides.scratch_dir.is_some() {
            self.scratch_dir = overrides.scratch_dir;
        }
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Global config directory (`~/.config/flaregate`), if the platform has one
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("flaregate"))
}

/// Find the config file.
///
/// Search order:
/// 1. `FLAREGATE_CONFIG` (direct path)
/// 2. current directory: `flaregate.local.yaml`, `flaregate.yaml`
/// 3. `~/.config/flaregate/config.yaml`
///
/// Returns `None` when nothing is found; defaults apply then.
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ConfigFileNotFound(path));
    }

    let current_dir = std::env::current_dir()?;
    for filename in ["flaregate.local.yaml", "flaregate.yaml"] {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if let Some(config_dir) = get_config_dir() {
        let global_config = config_dir.join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// Parse one YAML config file
pub fn load_file(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Err(ConfigError::ConfigFileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Defaults overlaid with the explicit file, or the discovered one
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file()?,
    };

    let settings = Settings::default();
    match path {
        Some(path) => Ok(settings.apply(load_file(&path)?)),
        None => Ok(settings),
    }
}
