//! Session and message DTOs.

use chrono::{DateTime, NaiveDateTime, Utc};
use parley_core::error::{ParleyError, Result};
use parley_core::session::{Message, ReasoningStep, Session, SessionDetail};
use serde::Deserialize;

/// Parses a server timestamp.
///
/// Accepts RFC 3339 and naive ISO 8601 (taken as UTC), which is what the
/// server emits for timestamps stored without an offset.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Entry of `GET /sessions/`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionDto {
    pub session_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub num_messages: u32,
}

impl From<SessionDto> for Session {
    fn from(dto: SessionDto) -> Self {
        Session {
            id: dto.session_id,
            title: dto.title,
            created_at: dto.created_at.as_deref().and_then(parse_timestamp),
            updated_at: dto.updated_at.as_deref().and_then(parse_timestamp),
            message_count: dto.num_messages,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThinkingStepDto {
    pub agent: String,
    pub action: String,
    #[serde(default)]
    pub detail: Option<String>,
}

impl From<ThinkingStepDto> for ReasoningStep {
    fn from(dto: ThinkingStepDto) -> Self {
        ReasoningStep {
            agent: dto.agent,
            action: dto.action,
            detail: dto.detail,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDto {
    pub question: String,
    pub answer: String,
    pub timestamp: String,
    #[serde(default)]
    pub thinking_steps: Option<Vec<ThinkingStepDto>>,
}

impl TryFrom<MessageDto> for Message {
    type Error = ParleyError;

    fn try_from(dto: MessageDto) -> Result<Self> {
        let timestamp = parse_timestamp(&dto.timestamp).ok_or_else(|| ParleyError::Serialization {
            format: "JSON".to_string(),
            message: format!("invalid message timestamp '{}'", dto.timestamp),
        })?;
        let steps = dto
            .thinking_steps
            .map(|steps| steps.into_iter().map(ReasoningStep::from).collect());
        Ok(Message::new(dto.question, dto.answer, timestamp).with_reasoning_steps(steps))
    }
}

/// Body of `GET /sessions/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionDetailDto {
    pub session_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub messages: Vec<MessageDto>,
}

impl TryFrom<SessionDetailDto> for SessionDetail {
    type Error = ParleyError;

    fn try_from(dto: SessionDetailDto) -> Result<Self> {
        let messages = dto
            .messages
            .into_iter()
            .map(Message::try_from)
            .collect::<Result<Vec<_>>>()?;
        let session = Session {
            id: dto.session_id,
            title: dto.title,
            created_at: dto.created_at.as_deref().and_then(parse_timestamp),
            updated_at: dto.updated_at.as_deref().and_then(parse_timestamp),
            message_count: messages.len() as u32,
        };
        Ok(SessionDetail { session, messages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_naive_and_offset_timestamps() {
        let naive = parse_timestamp("2024-05-01T08:30:00.123456").unwrap();
        assert_eq!((naive.month(), naive.day(), naive.hour()), (5, 1, 8));

        let offset = parse_timestamp("2024-05-01T15:30:00+07:00").unwrap();
        assert_eq!(offset.hour(), 8);

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_session_detail_keeps_order_and_optional_steps() {
        let json = r#"{
            "session_id": "s1",
            "title": null,
            "created_at": "2024-05-01T08:00:00",
            "messages": [
                {"question": "q1", "answer": "a1", "timestamp": "2024-05-01T08:01:00"},
                {"question": "q2", "answer": "a2", "timestamp": "2024-05-01T08:02:00",
                 "thinking_steps": [{"agent": "supervisor", "action": "route"},
                                    {"agent": "law", "action": "search", "detail": "Điều 5"}]}
            ]
        }"#;
        let dto: SessionDetailDto = serde_json::from_str(json).unwrap();
        let detail = SessionDetail::try_from(dto).unwrap();

        assert_eq!(detail.session.id, "s1");
        assert_eq!(detail.messages.len(), 2);
        assert_eq!(detail.messages[0].question, "q1");
        assert!(detail.messages[0].reasoning_steps.is_none());
        let steps = detail.messages[1].reasoning_steps.as_ref().unwrap();
        assert_eq!(steps[0].agent, "supervisor");
        assert_eq!(steps[1].detail.as_deref(), Some("Điều 5"));
    }

    #[test]
    fn test_bad_message_timestamp_is_rejected() {
        let dto = MessageDto {
            question: "q".into(),
            answer: "a".into(),
            timestamp: "not a date".into(),
            thinking_steps: None,
        };
        assert!(Message::try_from(dto).is_err());
    }

    #[test]
    fn test_session_list_entry_defaults() {
        let dto: SessionDto = serde_json::from_str(r#"{"session_id": "s9"}"#).unwrap();
        let session = Session::from(dto);
        assert_eq!(session.id, "s9");
        assert_eq!(session.message_count, 0);
        assert!(session.created_at.is_none());
    }
}
