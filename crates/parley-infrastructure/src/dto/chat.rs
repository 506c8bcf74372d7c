//! Chat, upload and session-mutation DTOs.

use parley_core::chat::ChatReply;
use parley_core::session::ReasoningStep;
use serde::{Deserialize, Serialize};

use super::session::ThinkingStepDto;

/// Body of `POST /chat/text`.
#[derive(Debug, Serialize)]
pub struct TextChatRequest<'a> {
    pub message: &'a str,
    pub session_id: Option<&'a str>,
}

/// Body of `POST /sessions/`.
#[derive(Debug, Serialize)]
pub struct CreateSessionRequest<'a> {
    pub title: Option<&'a str>,
}

/// Body of `PUT /sessions/{id}`.
#[derive(Debug, Serialize)]
pub struct UpdateSessionRequest<'a> {
    pub title: &'a str,
}

/// Response of `POST /chat/text` and `POST /chat/image`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseDto {
    #[serde(default)]
    pub session_id: Option<String>,
    pub response: String,
    #[serde(default)]
    pub thinking_steps: Option<Vec<ThinkingStepDto>>,
}

impl From<ChatResponseDto> for ChatReply {
    fn from(dto: ChatResponseDto) -> Self {
        ChatReply {
            answer: dto.response,
            session_id: dto.session_id.filter(|id| !id.is_empty()),
            reasoning_steps: dto
                .thinking_steps
                .map(|steps| steps.into_iter().map(ReasoningStep::from).collect()),
        }
    }
}

/// Response of `POST /chat/upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponseDto {
    pub file_id: String,
}

/// Response of `GET /chat/file/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct FileStatusDto {
    #[serde(default = "default_file_status")]
    pub status: String,
}

fn default_file_status() -> String {
    "uploaded".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_response_to_reply() {
        let dto: ChatResponseDto = serde_json::from_str(
            r#"{"session_id": "s1", "response": "Theo Điều 5...", "agent_name": "law",
                "thinking_steps": [{"agent": "supervisor", "action": "route"}]}"#,
        )
        .unwrap();
        let reply = ChatReply::from(dto);

        assert_eq!(reply.answer, "Theo Điều 5...");
        assert_eq!(reply.session_id.as_deref(), Some("s1"));
        assert_eq!(reply.reasoning_steps.unwrap().len(), 1);
    }

    #[test]
    fn test_empty_session_id_is_dropped() {
        let dto: ChatResponseDto =
            serde_json::from_str(r#"{"session_id": "", "response": "ok"}"#).unwrap();
        assert!(ChatReply::from(dto).session_id.is_none());
    }

    #[test]
    fn test_missing_status_defaults_to_uploaded() {
        let dto: FileStatusDto = serde_json::from_str(r#"{"file_id": "f1"}"#).unwrap();
        assert_eq!(dto.status, "uploaded");
    }

    #[test]
    fn test_text_request_serializes_null_session() {
        let body = serde_json::to_value(TextChatRequest {
            message: "xin chào",
            session_id: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"message": "xin chào", "session_id": null}));
    }
}
