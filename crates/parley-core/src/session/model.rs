//! Session domain model.

use super::message::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A conversation session as listed by the remote session store.
///
/// The orchestrator never owns sessions; it keeps a read-model of the list
/// and at most one active session id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session identifier issued by the server
    pub id: String,
    /// Optional user-facing title
    pub title: Option<String>,
    /// Creation time, if the server reported one
    pub created_at: Option<DateTime<Utc>>,
    /// Last activity time, if the server reported one
    pub updated_at: Option<DateTime<Utc>>,
    /// Number of question/answer pairs stored remotely
    #[serde(default)]
    pub message_count: u32,
}

impl Session {
    /// Creates a bare session with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            created_at: None,
            updated_at: None,
            message_count: 0,
        }
    }

    /// Returns the label shown in the session list.
    ///
    /// Falls back to the creation time (`dd/mm/yyyy HH:MM`) and then to
    /// `untitled` when neither a title nor a timestamp is known.
    pub fn display_title(&self, untitled: &str) -> String {
        if let Some(title) = self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            return title.to_string();
        }
        match self.created_at {
            Some(created_at) => created_at.format("%d/%m/%Y %H:%M").to_string(),
            None => untitled.to_string(),
        }
    }
}

/// A session together with its full message history, in server order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    pub session: Session,
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_title_prefers_title() {
        let mut session = Session::new("s1");
        session.title = Some("Luật đất đai".to_string());
        session.created_at = Some(Utc.with_ymd_and_hms(2024, 3, 5, 9, 7, 0).unwrap());

        assert_eq!(session.display_title("Phiên mới"), "Luật đất đai");
    }

    #[test]
    fn test_display_title_falls_back_to_creation_time() {
        let mut session = Session::new("s1");
        session.title = Some("   ".to_string());
        session.created_at = Some(Utc.with_ymd_and_hms(2024, 3, 5, 9, 7, 0).unwrap());

        assert_eq!(session.display_title("Phiên mới"), "05/03/2024 09:07");
    }

    #[test]
    fn test_display_title_untitled() {
        let session = Session::new("s1");
        assert_eq!(session.display_title("Phiên mới"), "Phiên mới");
    }
}
