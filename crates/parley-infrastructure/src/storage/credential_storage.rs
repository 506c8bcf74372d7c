//! Credential file storage.
//!
//! Persists the bearer token in `~/.config/parley/credential.json`.

use crate::paths::ParleyPaths;
use parley_core::credential::CredentialStore;
use parley_core::error::{ParleyError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

/// Seeds the credential when set.
pub const ENV_TOKEN: &str = "PARLEY_TOKEN";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    access_token: Option<String>,
}

/// File-backed credential store with an in-memory copy.
///
/// The file is plaintext JSON; it should have restrictive permissions.
pub struct FileCredentialStore {
    path: PathBuf,
    cached: RwLock<Option<String>>,
}

impl FileCredentialStore {
    /// Opens the default credential file, seeding it from `PARLEY_TOKEN`
    /// when that variable is set.
    pub fn open_default() -> Result<Self> {
        let store = Self::open(ParleyPaths::credential_file()?)?;
        if let Ok(token) = std::env::var(ENV_TOKEN) {
            if !token.trim().is_empty() {
                store.set_token(token.trim())?;
            }
        }
        Ok(store)
    }

    /// Opens a credential file at `path`. A missing file means no token.
    pub fn open(path: PathBuf) -> Result<Self> {
        let token = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                None
            } else {
                serde_json::from_str::<CredentialFile>(&content)?.access_token
            }
        } else {
            None
        };

        Ok(Self {
            path,
            cached: RwLock::new(token),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn persist(&self, token: Option<&str>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = CredentialFile {
            access_token: token.map(str::to_string),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }

    fn write_cache(&self, token: Option<String>) -> Result<()> {
        let mut guard = self
            .cached
            .write()
            .map_err(|_| ParleyError::internal("credential lock poisoned"))?;
        *guard = token;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn token(&self) -> Option<String> {
        self.cached.read().ok().and_then(|token| token.clone())
    }

    fn set_token(&self, token: &str) -> Result<()> {
        self.persist(Some(token))?;
        self.write_cache(Some(token.to_string()))
    }

    fn clear(&self) -> Result<()> {
        // Drop the in-memory copy first so a failed write still signs out.
        self.write_cache(None)?;
        self.persist(None)
    }
}
