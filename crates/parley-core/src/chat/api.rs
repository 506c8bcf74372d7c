//! The chat and document-processing endpoints the orchestrator calls.

use crate::attachment::FileUpload;
use crate::error::Result;
use crate::session::ReasoningStep;
use async_trait::async_trait;

/// Reply to a text or image question.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub answer: String,
    /// Session the exchange was recorded in (newly created if none was sent).
    pub session_id: Option<String>,
    pub reasoning_steps: Option<Vec<ReasoningStep>>,
}

/// Processing status of an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    Uploaded,
    Processed,
    ErrorProcessing,
    /// Any status this client does not know about. Treated as non-terminal.
    Other(String),
}

impl DocumentStatus {
    /// Parses the status string reported by the server.
    pub fn from_wire(status: &str) -> Self {
        match status {
            "uploaded" => Self::Uploaded,
            "processed" => Self::Processed,
            "error_processing" => Self::ErrorProcessing,
            other => Self::Other(other.to_string()),
        }
    }
}

/// The remote chat API.
///
/// Every call carries the bearer credential; a rejected credential surfaces
/// as `ParleyError::Unauthorized`.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Asks a text-only question.
    async fn send_text(&self, question: &str, session_id: Option<&str>) -> Result<ChatReply>;

    /// Asks a question about an inline image.
    async fn send_image(
        &self,
        question: &str,
        image: &FileUpload,
        session_id: Option<&str>,
    ) -> Result<ChatReply>;

    /// Uploads a document for background processing and returns its id.
    async fn upload_document(&self, file: &FileUpload, session_id: Option<&str>) -> Result<String>;

    /// Reports the processing status of an uploaded document.
    async fn document_status(&self, attachment_id: &str) -> Result<DocumentStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_status_from_wire() {
        assert_eq!(DocumentStatus::from_wire("processed"), DocumentStatus::Processed);
        assert_eq!(
            DocumentStatus::from_wire("error_processing"),
            DocumentStatus::ErrorProcessing
        );
        let indexing = DocumentStatus::from_wire("indexing");
        assert_eq!(indexing, DocumentStatus::Other("indexing".into()));
    }
}
