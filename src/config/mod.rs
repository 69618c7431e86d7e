//! Configuration management.
//!
//! The service endpoint is an explicit value handed to
//! [`ApiClient::new`](crate::api::ApiClient::new); nothing in the library reads
//! a global base URL.

mod file_config;

pub use file_config::{read_config_file, write_config_file, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Base endpoint of the reference deployment
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "paper-catalog.toml";

/// Prefix for environment overrides (`PAPER_CATALOG_API__BASE_URL`, ...)
pub const ENV_PREFIX: &str = "PAPER_CATALOG";

/// Separator between nested keys in environment overrides
pub const ENV_SEPARATOR: &str = "__";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Catalog service connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings for the catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base endpoint, e.g. `http://localhost:8000`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds. Unset means the transport default applies.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
            headers: BTreeMap::new(),
        }
    }
}

impl ApiConfig {
    /// Config pointing at the given endpoint with no extra headers
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration with environment overrides on top.
///
/// With `Some(path)` the file must exist. With `None` only defaults and the
/// environment apply. `PAPER_CATALOG_API__BASE_URL` overrides `api.base_url`,
/// `PAPER_CATALOG_LOGGING__LEVEL` overrides `logging.level`, and so on.
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR),
        )
        .build()?
        .try_deserialize()
}

/// Find a config file in the usual places
///
/// Looks for `./paper-catalog.toml` first, then
/// `<config dir>/paper-catalog/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("paper-catalog").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Parse a `Name: value` header argument.
pub fn parse_header_arg(arg: &str) -> Result<(String, String), String> {
    let (name, value) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name: value', got '{}'", arg))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in '{}'", arg));
    }

    Ok((name.to_string(), value.trim().to_string()))
}
