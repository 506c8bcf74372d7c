//! Session store trait.
//!
//! Defines the interface for the remote session CRUD operations.

use super::model::{Session, SessionDetail};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract store for the user's sessions.
///
/// The backend owns session persistence; implementations only translate
/// these calls to requests. Reads are assumed idempotent.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Lists sessions, newest first.
    async fn list(&self) -> Result<Vec<Session>>;

    /// Loads a session and its full message history.
    ///
    /// # Returns
    ///
    /// - `Ok(SessionDetail)`: Session found
    /// - `Err(ParleyError::NotFound)` or an HTTP 404: no such session
    async fn load(&self, session_id: &str) -> Result<SessionDetail>;

    /// Creates an empty session, optionally titled.
    async fn create(&self, title: Option<&str>) -> Result<Session>;

    /// Renames a session.
    async fn rename(&self, session_id: &str, title: &str) -> Result<()>;

    /// Deletes a session.
    async fn delete(&self, session_id: &str) -> Result<()>;

    /// Deletes every session of the current user.
    async fn delete_all(&self) -> Result<()>;
}
