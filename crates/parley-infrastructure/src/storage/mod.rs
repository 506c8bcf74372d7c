//! On-disk storage for client configuration and the bearer credential.

mod config_storage;
mod credential_storage;

pub use config_storage::{ConfigStorage, ENV_API_URL};
pub use credential_storage::{ENV_TOKEN, FileCredentialStore};
