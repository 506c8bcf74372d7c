//! Config file storage.
//!
//! Loads `config.toml` into `ParleyConfig`, then applies environment
//! overrides.

use crate::paths::ParleyPaths;
use parley_core::config::ParleyConfig;
use parley_core::error::Result;
use std::fs;
use std::path::PathBuf;

/// Overrides `[api] base_url`.
pub const ENV_API_URL: &str = "PARLEY_API_URL";

/// Read-only access to `config.toml`.
///
/// A missing or empty file is not an error; it yields the defaults.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Creates a storage handle for the default path (`~/.config/parley/config.toml`).
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: ParleyPaths::config_file()?,
        })
    }

    /// Creates a storage handle with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Loads the file without environment overrides.
    pub fn load_file(&self) -> Result<ParleyConfig> {
        if !self.path.exists() {
            tracing::debug!("[Config] {:?} not found, using defaults", self.path);
            return Ok(ParleyConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ParleyConfig::default());
        }

        ParleyConfig::from_toml_str(&content)
    }

    /// Loads the file and applies `PARLEY_API_URL`.
    pub fn load(&self) -> Result<ParleyConfig> {
        let mut config = self.load_file()?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }
}

fn apply_env_overrides(config: &mut ParleyConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
        tracing::info!("[Config] API URL overridden by {}", ENV_API_URL);
        config.api.base_url = url.trim().to_string();
    }
}
