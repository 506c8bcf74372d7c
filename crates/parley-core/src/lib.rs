//! Domain layer for Parley.
//!
//! Sessions, transcripts and staged attachments, plus the collaborator
//! traits (`ChatApi`, `SessionStore`, `CredentialStore`) that the
//! orchestrator in `parley-application` drives.

pub mod attachment;
pub mod chat;
pub mod config;
pub mod credential;
pub mod error;
pub mod notice;
pub mod session;

// Re-export common error type
pub use error::{ParleyError, Result};
