//! Client configuration.
//!
//! Sources, lowest to highest precedence: built-in defaults, the optional
//! `mockmate.toml` in the data directory, then `MOCKMATE_*` environment
//! variables (a `.env` file is read first).

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const CONFIG_FILE: &str = "mockmate.toml";
pub const HOME_ENV: &str = "MOCKMATE_HOME";
const ENV_PREFIX: &str = "MOCKMATE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Could not determine a data directory; set MOCKMATE_HOME")]
    NoDataDir,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
    /// The countdown is flagged urgent below this many seconds.
    pub urgency_threshold_secs: u32,
    pub default_time_limit_secs: u32,
    pub tick_interval_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            data_dir: None,
            request_timeout_secs: 30,
            urgency_threshold_secs: 10,
            default_time_limit_secs: crate::api::DEFAULT_TIME_LIMIT_SECS,
            tick_interval_ms: 1000,
        }
    }
}

impl ClientConfig {
    /// Loads `.env`, then the config file from the data directory, then the
    /// environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let file = mockmate_home().map(|home| home.join(CONFIG_FILE));
        Self::load_from(file.as_deref())
    }

    /// Like [`load`](Self::load) with an explicit config file path.
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let mut builder = defaults()?;
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));
        finish(builder.build()?)
    }

    /// Defaults plus a single file, ignoring the environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = defaults()?.add_source(File::from(path).format(FileFormat::Toml).required(true));
        finish(builder.build()?)
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => mockmate_home().ok_or(ConfigError::NoDataDir),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
    let d = ClientConfig::default();
    Ok(Config::builder()
        .set_default("api_base_url", d.api_base_url)?
        .set_default("request_timeout_secs", d.request_timeout_secs as i64)?
        .set_default("urgency_threshold_secs", i64::from(d.urgency_threshold_secs))?
        .set_default("default_time_limit_secs", i64::from(d.default_time_limit_secs))?
        .set_default("tick_interval_ms", d.tick_interval_ms as i64)?)
}

fn finish(config: Config) -> Result<ClientConfig> {
    let mut loaded: ClientConfig = config.try_deserialize()?;
    loaded.api_base_url = validate_base_url(&loaded.api_base_url)?;
    Ok(loaded)
}

/// `MOCKMATE_HOME`, else the platform config directory.
pub fn mockmate_home() -> Option<PathBuf> {
    if let Ok(home) = env::var(HOME_ENV) {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }
    ProjectDirs::from("com", "mockmate", "mockmate").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Accepts absolute http(s) URLs and strips any trailing slash.
pub fn validate_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let parsed = url::Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.trim_end_matches('/').to_string()),
        other => Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
