use crate::debounce::DEFAULT_QUIET_WINDOW;
use crate::source::{DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the users endpoint.
pub const SOURCE_URL_ENV: &str = "ROSTER_SOURCE_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SourceConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Quiet window for name/city changes in the interactive viewer.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl FilterConfig {
    #[must_use]
    pub const fn quiet_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_debounce_ms() -> u64 {
    u64::try_from(DEFAULT_QUIET_WINDOW.as_millis()).unwrap_or(1000)
}

/// Path of the per-user config file (`<config dir>/roster/config.toml`).
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("roster/config.toml"))
}

/// Load config from `path`; a missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_from(path: &Path) -> Result<RosterConfig> {
    if !path.exists() {
        return Ok(RosterConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<RosterConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load the per-user config, or defaults when there is none.
///
/// # Errors
///
/// Returns an error if the config file exists but is malformed.
pub fn load_user_config() -> Result<RosterConfig> {
    user_config_path().map_or_else(
        || Ok(RosterConfig::default()),
        |path| load_config_from(&path),
    )
}

/// Resolve the users endpoint.
///
/// Precedence (highest wins): CLI flag, `ROSTER_SOURCE_URL`, config file.
#[must_use]
pub fn resolve_source_url(cli_url: Option<&str>, config: &RosterConfig) -> String {
    let env_url = std::env::var(SOURCE_URL_ENV).ok();
    resolve_source_url_inner(cli_url, env_url.as_deref(), config)
}

fn resolve_source_url_inner(
    cli_url: Option<&str>,
    env_url: Option<&str>,
    config: &RosterConfig,
) -> String {
    cli_url
        .or(env_url)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map_or_else(|| config.source.url.clone(), str::to_string)
}
