//! Unified path management for parley configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/parley/            # Config directory (platform default)
//! ├── config.toml              # Client configuration
//! ├── credential.json          # Bearer token
//! └── history.txt              # Readline history
//! ```

use parley_core::error::{ParleyError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "parley";

/// Unified path management for parley.
pub struct ParleyPaths;

impl ParleyPaths {
    /// Returns the parley configuration directory.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when the platform config directory cannot be
    /// determined (no home directory).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| ParleyError::config("Cannot find home directory"))
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to `credential.json`.
    pub fn credential_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("credential.json"))
    }

    /// Returns the path to the readline history file.
    pub fn history_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("history.txt"))
    }
}
