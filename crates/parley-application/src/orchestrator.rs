//! ChatOrchestrator - the entry point the chat view talks to.
//!
//! Wires the attachment stager, message exchange and session coordinator
//! around one shared [`ChatState`]. Every operation reports its result as an
//! outcome value; user-visible problems also go out on the notice channel
//! returned by [`ChatOrchestrator::new`].

use parley_core::attachment::{FileUpload, StagedAttachment};
use parley_core::chat::ChatApi;
use parley_core::credential::CredentialStore;
use parley_core::error::Result;
use parley_core::session::SessionStore;
use std::sync::Arc;

use crate::attachment_stager::AttachmentStager;
use crate::context::{ChatContext, NoticeReceiver, OrchestratorSettings};
use crate::exchange::{MessageExchange, SendOutcome};
use crate::session_switch::{SessionSwitchCoordinator, SwitchOutcome, UpdateOutcome};
use crate::state::ChatState;

pub struct ChatOrchestrator {
    context: Arc<ChatContext>,
    attachments: AttachmentStager,
    exchange: MessageExchange,
    sessions: SessionSwitchCoordinator,
}

impl ChatOrchestrator {
    /// Creates an orchestrator with no active session.
    ///
    /// The returned receiver yields every [`Notice`](parley_core::notice::Notice)
    /// the view should show.
    pub fn new(
        chat_api: Arc<dyn ChatApi>,
        session_store: Arc<dyn SessionStore>,
        credentials: Arc<dyn CredentialStore>,
        settings: OrchestratorSettings,
    ) -> (Self, NoticeReceiver) {
        let (context, notices) = ChatContext::new(chat_api, session_store, credentials, settings);
        (Self::from_context(Arc::new(context)), notices)
    }

    fn from_context(context: Arc<ChatContext>) -> Self {
        Self {
            attachments: AttachmentStager::new(context.clone()),
            exchange: MessageExchange::new(context.clone()),
            sessions: SessionSwitchCoordinator::new(context.clone()),
            context,
        }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.context.settings
    }

    /// A copy of the current state for rendering.
    pub async fn snapshot(&self) -> ChatState {
        self.context.state.read().await.clone()
    }

    pub async fn is_signed_out(&self) -> bool {
        self.context.state.read().await.is_signed_out()
    }

    pub async fn set_draft(&self, draft: impl Into<String>) {
        self.context.state.write().await.draft = draft.into();
    }

    // === Attachments ===

    /// See [`AttachmentStager::stage_file`].
    pub async fn stage_file(&self, file: FileUpload) -> Result<StagedAttachment> {
        self.attachments.stage_file(file).await
    }

    pub async fn clear_attachment(&self) -> Option<StagedAttachment> {
        self.attachments.clear().await
    }

    // === Messages ===

    pub async fn send(&self, question: &str) -> SendOutcome {
        self.exchange.send(question).await
    }

    /// Sends whatever is in the draft.
    pub async fn send_draft(&self) -> SendOutcome {
        let draft = self.context.state.read().await.draft.clone();
        self.exchange.send(&draft).await
    }

    // === Sessions ===

    pub async fn activate(&self, session_id: Option<&str>) -> SwitchOutcome {
        self.sessions.activate(session_id).await
    }

    pub async fn refresh_sessions(&self) -> UpdateOutcome {
        self.sessions.refresh_sessions().await
    }

    pub async fn create_session(&self, title: Option<&str>) -> SwitchOutcome {
        self.sessions.create_session(title).await
    }

    pub async fn rename_session(&self, session_id: &str, title: &str) -> UpdateOutcome {
        self.sessions.rename_session(session_id, title).await
    }

    pub async fn delete_session(&self, session_id: &str) -> UpdateOutcome {
        self.sessions.delete_session(session_id).await
    }

    pub async fn delete_all_sessions(&self) -> UpdateOutcome {
        self.sessions.delete_all_sessions().await
    }
}
