//! Infrastructure layer for Parley.
//!
//! HTTP client for the remote chat/session API, wire DTOs, on-disk
//! configuration and credential storage, and local file loading.

pub mod dto;
pub mod file_loader;
pub mod http_client;
pub mod paths;
pub mod storage;

pub use crate::file_loader::load_file_upload;
pub use crate::http_client::HttpChatApi;
pub use crate::paths::ParleyPaths;
pub use crate::storage::{ConfigStorage, FileCredentialStore};
