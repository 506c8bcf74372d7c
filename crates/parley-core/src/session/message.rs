//! Conversation message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One step of the assistant's reasoning, as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningStep {
    /// Label of the agent that performed the step
    pub agent: String,
    /// What the agent did
    pub action: String,
    /// Optional free-form detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// A completed question/answer pair in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
    /// Reasoning steps in the order the server produced them.
    /// `None` when the server sent none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_steps: Option<Vec<ReasoningStep>>,
}

impl Message {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            timestamp,
            reasoning_steps: None,
        }
    }

    /// Attaches reasoning steps, dropping an empty sequence.
    pub fn with_reasoning_steps(mut self, steps: Option<Vec<ReasoningStep>>) -> Self {
        self.reasoning_steps = steps.filter(|s| !s.is_empty());
        self
    }
}

/// The transient "send in flight" entry at the tail of the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingMessage {
    pub question: String,
    /// Sentinel text shown in place of the answer
    pub placeholder: String,
    pub timestamp: DateTime<Utc>,
}

impl PendingMessage {
    /// Renders the placeholder as a message-shaped value.
    pub fn to_message(&self) -> Message {
        Message::new(&self.question, &self.placeholder, self.timestamp)
    }
}
