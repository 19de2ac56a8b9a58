//! Configuration resolution for Centertech.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (`<config dir>/centertech/settings.json`)
//! 3. Explicit config file (`--config`)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the caller)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::guard::DEFAULT_LOGIN_PATH;
use crate::tracing_init::LogFormat;

/// Complete Centertech configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where the persistent key-value store lives.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Store file. `None` resolves to [`default_store_path`].
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Configured path, else the per-user default, else `centertech.json`
    /// in the working directory.
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .or_else(default_store_path)
            .unwrap_or_else(|| PathBuf::from("centertech.json"))
    }
}

/// Remote user-listing service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://api.centertech.example`. Empty means unset.
    #[serde(default)]
    pub base_url: String,
}

/// Route guard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
        }
    }
}

/// One config file layer. Only the keys present in the file override the
/// layers below it.
#[derive(Debug, Default, Deserialize)]
struct ConfigLayer {
    #[serde(default)]
    storage: StorageLayer,
    #[serde(default)]
    api: ApiLayer,
    #[serde(default)]
    auth: AuthLayer,
    #[serde(default)]
    log_level: Option<String>,
    #[serde(default)]
    log_format: Option<LogFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct StorageLayer {
    #[serde(default)]
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiLayer {
    #[serde(default)]
    base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthLayer {
    #[serde(default)]
    login_path: Option<String>,
}

/// Load configuration with hierarchical resolution.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let global = global_config_path().filter(|p| p.exists());
    let mut config = load_config_files(global.as_deref(), explicit)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Defaults, then the global file, then the explicit file.
fn load_config_files(global: Option<&Path>, explicit: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();
    for path in [global, explicit].into_iter().flatten() {
        let layer = load_config_file(path)?;
        merge_config(&mut config, layer);
    }
    Ok(config)
}

/// Global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("centertech").join("settings.json"))
}

/// Default store file path.
pub fn default_store_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("centertech").join("store.json"))
}

fn load_config_file(path: &Path) -> Result<ConfigLayer> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, layer: ConfigLayer) {
    if let Some(path) = layer.storage.path {
        base.storage.path = Some(path);
    }
    if let Some(url) = layer.api.base_url.filter(|u| !u.is_empty()) {
        base.api.base_url = url;
    }
    if let Some(login_path) = layer.auth.login_path {
        base.auth.login_path = login_path;
    }
    if let Some(level) = layer.log_level {
        base.log_level = level;
    }
    if let Some(format) = layer.log_format {
        base.log_format = format;
    }
}

fn apply_env_overrides(config: &mut Config) {
    apply_overrides(config, |name| std::env::var(name).ok());
}

fn apply_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("CENTERTECH_STORE_PATH") {
        config.storage.path = Some(PathBuf::from(val));
    }
    if let Some(val) = var("CENTERTECH_API_URL") {
        config.api.base_url = val;
    }
    if let Some(val) = var("CENTERTECH_LOGIN_PATH") {
        config.auth.login_path = val;
    }
    if let Some(val) = var("CENTERTECH_LOG_LEVEL") {
        config.log_level = val;
    }
    if let Some(format) = var("CENTERTECH_LOG_FORMAT").and_then(|v| v.parse().ok()) {
        config.log_format = format;
    }
}
