//! The visible conversation of the active session.

use super::message::{Message, PendingMessage, ReasoningStep};
use crate::error::{ParleyError, Result};
use chrono::{DateTime, Utc};

/// Settled messages plus at most one pending placeholder at the tail.
///
/// The placeholder lives outside `messages`, so "at most one, always last"
/// holds by construction. `epoch` changes whenever the transcript is
/// replaced wholesale, which lets a late send result detect that the
/// placeholder it was issued for is gone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
    pending: Option<PendingMessage>,
    epoch: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settled messages, excluding the placeholder.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn pending(&self) -> Option<&PendingMessage> {
        self.pending.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of visible entries, placeholder included.
    pub fn len(&self) -> usize {
        self.messages.len() + usize::from(self.pending.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Everything the view shows, in order, with the placeholder rendered last.
    pub fn entries(&self) -> Vec<Message> {
        let mut entries = self.messages.clone();
        if let Some(pending) = &self.pending {
            entries.push(pending.to_message());
        }
        entries
    }

    /// Replaces the transcript with a loaded history.
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.pending = None;
        self.epoch += 1;
    }

    pub fn clear(&mut self) {
        self.replace_all(Vec::new());
    }

    /// Appends the pending placeholder.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if a placeholder already exists.
    pub fn begin_pending(
        &mut self,
        question: impl Into<String>,
        placeholder: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        if self.pending.is_some() {
            return Err(ParleyError::conflict("a message is already pending"));
        }
        self.pending = Some(PendingMessage {
            question: question.into(),
            placeholder: placeholder.into(),
            timestamp,
        });
        Ok(())
    }

    /// Replaces the placeholder with the settled answer.
    ///
    /// Returns `false` (and changes nothing) when there is no placeholder.
    pub fn resolve_pending(
        &mut self,
        answer: impl Into<String>,
        timestamp: DateTime<Utc>,
        reasoning_steps: Option<Vec<ReasoningStep>>,
    ) -> bool {
        match self.pending.take() {
            Some(pending) => {
                self.messages.push(
                    Message::new(pending.question, answer, timestamp)
                        .with_reasoning_steps(reasoning_steps),
                );
                true
            }
            None => false,
        }
    }

    /// Settles the placeholder with a failure text, keeping its question
    /// and timestamp.
    pub fn fail_pending(&mut self, failure: impl Into<String>) -> bool {
        match self.pending.take() {
            Some(pending) => {
                self.messages
                    .push(Message::new(pending.question, failure, pending.timestamp));
                true
            }
            None => false,
        }
    }
}
