//! Service configuration.
//!
//! Sources, lowest to highest precedence:
//! 1. built-in defaults
//! 2. a YAML file (`--config`, `CODEWARD_CONFIG`, or the platform config dir)
//! 3. `CODEWARD_*` environment variables
//!
//! ```yaml
//! backend:
//!   base_url: http://localhost:1234
//!   model: qwen/qwen3-coder-30b
//!   api_key: sk-...
//!   timeout_secs: 120
//! server:
//!   name: codeward
//! ```

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_BASE_URL: &str = "CODEWARD_BASE_URL";
pub const ENV_MODEL: &str = "CODEWARD_MODEL";
pub const ENV_API_KEY: &str = "CODEWARD_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "CODEWARD_TIMEOUT_SECS";
pub const ENV_SERVER_NAME: &str = "CODEWARD_SERVER_NAME";
pub const ENV_SERVER_VERSION: &str = "CODEWARD_SERVER_VERSION";
pub const ENV_CONFIG: &str = "CODEWARD_CONFIG";

const DEFAULT_BASE_URL: &str = "http://localhost:1234";
const DEFAULT_MODEL: &str = "qwen/qwen3-coder-30b";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_SERVER_NAME: &str = "codeward";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where and how to reach the model backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub model: String,
    /// Sent as a bearer token when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Identity reported to protocol clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Config {
    /// Parse a configuration from a YAML file. Missing keys keep their defaults.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Load from the process environment and the resolved config file.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let env = |key: &str| std::env::var(key).ok();
        let file = config_file(explicit, &env);
        Self::load_from(file.as_deref(), env)
    }

    /// Load from an optional file, then overlay values from `env`.
    pub fn load_from<F>(file: Option<&Path>, env: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match file {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config file");
                Self::parse_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env<F>(&mut self, env: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_BASE_URL) {
            self.backend.base_url = url;
        }
        if let Some(model) = get(ENV_MODEL) {
            self.backend.model = model;
        }
        if let Some(key) = get(ENV_API_KEY) {
            self.backend.api_key = Some(key);
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            self.backend.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds, got {:?}", ENV_TIMEOUT_SECS, secs))?;
        }
        if let Some(name) = get(ENV_SERVER_NAME) {
            self.server.name = name;
        }
        if let Some(version) = get(ENV_SERVER_VERSION) {
            self.server.version = version;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.backend.base_url.trim().is_empty() {
            bail!("backend base_url must not be empty");
        }
        if self.backend.model.trim().is_empty() {
            bail!("backend model must not be empty");
        }
        if self.backend.timeout_secs == 0 {
            bail!("backend timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

/// Resolve which config file to read, if any.
///
/// An explicit path or `CODEWARD_CONFIG` is returned as given (a missing file
/// is then an error). The platform default is only used when it exists.
pub fn config_file<F>(explicit: Option<&Path>, env: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env(ENV_CONFIG).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    default_config_path().filter(|p| p.is_file())
}

/// `<platform config dir>/codeward/config.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "codeward").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
