//! Session domain module.
//!
//! This module contains the session and message models, the transcript that
//! the chat view renders, and the store interface for session CRUD.
//!
//! # Module Structure
//!
//! - `model`: Session summary and detail (`Session`, `SessionDetail`)
//! - `message`: Question/answer pairs and reasoning steps (`Message`, `ReasoningStep`)
//! - `transcript`: Visible conversation with at most one pending placeholder (`Transcript`)
//! - `repository`: Store trait for the remote session list (`SessionStore`)

mod message;
mod model;
mod repository;
mod transcript;

// Re-export public API
pub use message::{Message, PendingMessage, ReasoningStep};
pub use model::{Session, SessionDetail};
pub use repository::SessionStore;
pub use transcript::Transcript;
