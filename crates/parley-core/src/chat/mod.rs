//! Chat transport contracts.
//!
//! - `api`: the `ChatApi` trait plus its reply and status types

mod api;

pub use api::{ChatApi, ChatReply, DocumentStatus};
