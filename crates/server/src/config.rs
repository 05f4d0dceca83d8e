// Server configuration.
//
// Environment variables carry the credential and override an optional TOML
// file: `--config <path>` or `<config_dir>/notion-mcp/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::infrastructure::notion::client::{DEFAULT_API_BASE_URL, DEFAULT_NOTION_VERSION};
use crate::infrastructure::notion::NotionClientConfig;

pub const API_KEY_VAR: &str = "NOTION_API_KEY";
pub const API_BASE_URL_VAR: &str = "NOTION_API_BASE_URL";
pub const API_VERSION_VAR: &str = "NOTION_API_VERSION";
pub const LOG_FILTER_VAR: &str = "NOTION_MCP_LOG_FILTER";
pub const HTTP_TIMEOUT_VAR: &str = "NOTION_MCP_HTTP_TIMEOUT_SECS";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Path to the default config file: `<config_dir>/notion-mcp/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("notion-mcp").join("config.toml"))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("NOTION_API_KEY environment variable is required")]
    MissingApiKey,
    #[error("failed to read config file {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("invalid API base URL `{value}`: {source}")]
    InvalidBaseUrl { value: String, source: url::ParseError },
    #[error("invalid value for {key}: `{value}`")]
    InvalidValue { key: &'static str, value: String },
}

// ── Config file ────────────────────────────────────────────────────

/// Optional settings file. The API key is deliberately not a field, so a
/// file carrying one is rejected.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_base_url: Option<String>,
    pub notion_version: Option<String>,
    pub log_filter: Option<String>,
    pub http_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load from a specific path. A missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Load from the default location; defaults when the file doesn't exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }
}

// ── Server config ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api_key: String,
    pub api_base_url: Url,
    pub notion_version: String,
    /// Log filter directive (e.g. `info`, `notion_mcp_server=debug`).
    pub log_filter: String,
    /// Per-request timeout; `None` waits indefinitely.
    pub http_timeout: Option<Duration>,
}

impl ServerConfig {
    /// Environment on top of the config file named by `config_path`, or the
    /// default file when `None`.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `NOTION_API_KEY` | *(required)* |
    /// | `NOTION_API_BASE_URL` | `https://api.notion.com/v1` |
    /// | `NOTION_API_VERSION` | `2022-06-28` |
    /// | `NOTION_MCP_LOG_FILTER` | `info` |
    /// | `NOTION_MCP_HTTP_TIMEOUT_SECS` | *(none)* |
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match config_path {
            Some(path) => FileConfig::load_from(path)?,
            None => FileConfig::load_default()?,
        };
        Self::from_sources(|key| std::env::var(key), file)
    }

    /// Environment only.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_sources(|key| std::env::var(key), FileConfig::default())
    }

    /// Testable constructor that accepts an environment lookup function.
    fn from_sources<F>(env: F, file: FileConfig) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        // Blank values count as unset.
        let lookup = |key: &str| env(key).ok().filter(|value| !value.trim().is_empty());

        let api_key = lookup(API_KEY_VAR).ok_or(ConfigError::MissingApiKey)?;

        let raw_base_url = lookup(API_BASE_URL_VAR)
            .or(file.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.into());
        let api_base_url = Url::parse(&raw_base_url)
            .map_err(|source| ConfigError::InvalidBaseUrl { value: raw_base_url.clone(), source })?;

        let notion_version = lookup(API_VERSION_VAR)
            .or(file.notion_version)
            .unwrap_or_else(|| DEFAULT_NOTION_VERSION.into());

        let log_filter = lookup(LOG_FILTER_VAR)
            .or(file.log_filter)
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.into());

        let timeout_secs = match lookup(HTTP_TIMEOUT_VAR) {
            Some(value) => Some(
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue { key: HTTP_TIMEOUT_VAR, value })?,
            ),
            None => file.http_timeout_secs,
        };
        let http_timeout = timeout_secs.filter(|secs| *secs > 0).map(Duration::from_secs);

        Ok(Self { api_key, api_base_url, notion_version, log_filter, http_timeout })
    }

    pub fn client_config(&self) -> NotionClientConfig {
        NotionClientConfig {
            api_key: self.api_key.clone(),
            base_url: self.api_base_url.clone(),
            notion_version: self.notion_version.clone(),
            timeout: self.http_timeout,
        }
    }
}
