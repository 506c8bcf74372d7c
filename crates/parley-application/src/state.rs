//! The session-scoped state bag shared by every orchestrator component.

use parley_core::attachment::{AttachmentGeneration, AttachmentSlot, DocumentState, StagedAttachment};
use parley_core::session::{Session, Transcript};
use tokio_util::sync::CancellationToken;

/// Why a send did not go out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejection {
    /// The question is empty after trimming.
    BlankQuestion,
    /// Another send has not resolved yet.
    SendInFlight,
    /// A session history is still loading.
    SessionLoading,
    /// The staged attachment is not ready (uploading, processing or failed).
    AttachmentNotReady,
}

/// Why a session switch was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchRejection {
    SendInFlight,
    SessionLoading,
    /// A document upload request is still in flight.
    UploadInFlight,
}

/// Everything the chat view renders, in one place.
///
/// Components mutate it only while holding the orchestrator's lock and never
/// across a network call.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub(crate) sessions: Vec<Session>,
    pub(crate) active_session: Option<String>,
    pub(crate) transcript: Transcript,
    pub(crate) attachment: AttachmentSlot,
    pub(crate) draft: String,
    pub(crate) sending: bool,
    pub(crate) loading_session: bool,
    pub(crate) signed_out: bool,
    /// Wakes the poller of the current document when it is cleared or replaced.
    pub(crate) poll_cancel: Option<CancellationToken>,
}

impl ChatState {
    /// Cached session list, newest first.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn active_session(&self) -> Option<&str> {
        self.active_session.as_deref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn attachment(&self) -> Option<&StagedAttachment> {
        self.attachment.current()
    }

    pub fn attachment_generation(&self) -> AttachmentGeneration {
        self.attachment.generation()
    }

    /// Unsent text in the input field.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn is_loading_session(&self) -> bool {
        self.loading_session
    }

    /// Set once the credential has been rejected.
    pub fn is_signed_out(&self) -> bool {
        self.signed_out
    }

    /// Whether the file picker should be enabled.
    pub fn can_stage_file(&self) -> bool {
        !self.attachment.is_blocking()
    }

    /// Checks every guard on `send` except the question itself.
    pub fn check_send(&self) -> Result<(), SendRejection> {
        if self.sending {
            return Err(SendRejection::SendInFlight);
        }
        if self.loading_session {
            return Err(SendRejection::SessionLoading);
        }
        if !self.attachment.allows_send() {
            return Err(SendRejection::AttachmentNotReady);
        }
        Ok(())
    }

    /// Checks the guards on a user-initiated session switch.
    pub fn check_switch(&self) -> Result<(), SwitchRejection> {
        if self.sending {
            return Err(SwitchRejection::SendInFlight);
        }
        if self.loading_session {
            return Err(SwitchRejection::SessionLoading);
        }
        let uploading = matches!(
            self.attachment.current(),
            Some(StagedAttachment::Document(document)) if document.state == DocumentState::Uploading
        );
        if uploading {
            return Err(SwitchRejection::UploadInFlight);
        }
        Ok(())
    }

    /// Stages `attachment`, cancelling the poller of the one it replaces.
    pub(crate) fn stage_attachment(
        &mut self,
        attachment: StagedAttachment,
    ) -> (AttachmentGeneration, CancellationToken) {
        self.cancel_poller();
        let token = CancellationToken::new();
        self.poll_cancel = Some(token.clone());
        (self.attachment.stage(attachment), token)
    }

    pub(crate) fn clear_attachment(&mut self) -> Option<StagedAttachment> {
        self.cancel_poller();
        self.attachment.clear()
    }

    pub(crate) fn clear_attachment_if_current(&mut self, generation: AttachmentGeneration) -> bool {
        if self.attachment.is_current(generation) {
            self.clear_attachment();
            true
        } else {
            false
        }
    }

    /// Drops the active session and its transcript. The attachment stays.
    pub(crate) fn deactivate(&mut self) {
        self.active_session = None;
        self.transcript.clear();
    }

    fn cancel_poller(&mut self) {
        if let Some(token) = self.poll_cancel.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::attachment::FileUpload;

    #[test]
    fn test_send_guards() {
        let mut state = ChatState::default();
        assert_eq!(state.check_send(), Ok(()));

        state.stage_attachment(StagedAttachment::uploading_document("a.pdf"));
        assert_eq!(state.check_send(), Err(SendRejection::AttachmentNotReady));
        assert!(!state.can_stage_file());

        state.clear_attachment();
        state.sending = true;
        assert_eq!(state.check_send(), Err(SendRejection::SendInFlight));
    }

    #[test]
    fn test_switch_blocked_only_while_uploading() {
        let mut state = ChatState::default();
        let (generation, _) = state.stage_attachment(StagedAttachment::uploading_document("a.pdf"));
        assert_eq!(state.check_switch(), Err(SwitchRejection::UploadInFlight));

        state
            .attachment
            .set_document_state(generation, DocumentState::Uploaded { id: "f1".into() });
        assert_eq!(state.check_switch(), Ok(()));
    }

    #[test]
    fn test_replacing_attachment_cancels_previous_poller() {
        let mut state = ChatState::default();
        let (_, first_token) = state.stage_attachment(StagedAttachment::uploading_document("a.pdf"));
        let (_, second_token) = state.stage_attachment(StagedAttachment::image(FileUpload::new(
            "b.png",
            Some("image/png".into()),
            vec![1],
        )));

        assert!(first_token.is_cancelled());
        assert!(!second_token.is_cancelled());

        state.clear_attachment();
        assert!(second_token.is_cancelled());
    }

    #[test]
    fn test_deactivate_keeps_attachment() {
        let mut state = ChatState::default();
        state.active_session = Some("s1".into());
        state.stage_attachment(StagedAttachment::uploading_document("a.pdf"));

        state.deactivate();

        assert!(state.active_session().is_none());
        assert!(state.transcript().is_empty());
        assert!(state.attachment().is_some());
    }
}
