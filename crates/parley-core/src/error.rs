//! Error types for the Parley client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Parley client.
///
/// Collaborators (HTTP client, credential store, config loader) return this
/// type; the orchestrator converts it into notices or transcript updates
/// instead of handing it back to the view.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParleyError {
    /// The picked file is neither an image nor a supported document.
    #[error("Unsupported media type: '{name}'")]
    UnsupportedMediaType { name: String },

    /// An operation was attempted while a blocking state is active.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Network failure before any HTTP status was received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The credential was rejected or is missing.
    #[error("Unauthorized")]
    Unauthorized,

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ParleyError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an UnsupportedMediaType error
    pub fn unsupported_media_type(name: impl Into<String>) -> Self {
        Self::UnsupportedMediaType { name: name.into() }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates an Http error
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if the credential was rejected.
    ///
    /// Callers treat this as a hard signal to discard the credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Check if this is a Conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Http { status: 404, .. })
    }

    /// Check if the failure happened on the wire (no response or bad status).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Http { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ParleyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ParleyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ParleyError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ParleyError>`.
pub type Result<T> = std::result::Result<T, ParleyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_404_counts_as_not_found() {
        assert!(ParleyError::http(404, "missing").is_not_found());
        assert!(ParleyError::not_found("session", "s1").is_not_found());
        assert!(!ParleyError::http(500, "boom").is_not_found());
    }

    #[test]
    fn test_transport_predicates() {
        assert!(ParleyError::transport("connection reset").is_transport());
        assert!(ParleyError::http(502, "bad gateway").is_transport());
        assert!(!ParleyError::Unauthorized.is_transport());
        assert!(ParleyError::Unauthorized.is_unauthorized());
    }

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let err: ParleyError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        match err {
            ParleyError::Io { message } => assert!(message.contains("PermissionDenied")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
