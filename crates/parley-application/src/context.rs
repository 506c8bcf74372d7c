//! Dependencies and shared state handed to every component.

use parley_core::chat::ChatApi;
use parley_core::config::{ParleyConfig, PollPolicy, TextConfig};
use parley_core::credential::CredentialStore;
use parley_core::error::ParleyError;
use parley_core::notice::Notice;
use parley_core::session::SessionStore;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};

use crate::state::ChatState;

/// Receiving end of the notice channel, consumed by the view.
pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

/// Policy and text settings the orchestrator needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrchestratorSettings {
    pub poll: PollPolicy,
    pub text: TextConfig,
}

impl From<&ParleyConfig> for OrchestratorSettings {
    fn from(config: &ParleyConfig) -> Self {
        Self {
            poll: PollPolicy::from(&config.polling),
            text: config.text.clone(),
        }
    }
}

pub(crate) struct ChatContext {
    pub(crate) state: RwLock<ChatState>,
    pub(crate) chat_api: Arc<dyn ChatApi>,
    pub(crate) session_store: Arc<dyn SessionStore>,
    pub(crate) credentials: Arc<dyn CredentialStore>,
    pub(crate) settings: OrchestratorSettings,
    notices: mpsc::UnboundedSender<Notice>,
}

impl ChatContext {
    pub(crate) fn new(
        chat_api: Arc<dyn ChatApi>,
        session_store: Arc<dyn SessionStore>,
        credentials: Arc<dyn CredentialStore>,
        settings: OrchestratorSettings,
    ) -> (Self, NoticeReceiver) {
        let (notices, receiver) = mpsc::unbounded_channel();
        let context = Self {
            state: RwLock::new(ChatState::default()),
            chat_api,
            session_store,
            credentials,
            settings,
            notices,
        };
        (context, receiver)
    }

    pub(crate) fn notify(&self, notice: Notice) {
        tracing::debug!("[Notice] {:?}", notice);
        // Nobody listening is fine; the view may have shut down.
        let _ = self.notices.send(notice);
    }

    /// Reports a failed remote call.
    ///
    /// A rejected credential is discarded and turns into `SignedOut`;
    /// anything else raises `fallback`, if given.
    pub(crate) async fn report_failure(&self, err: &ParleyError, fallback: Option<Notice>) {
        if err.is_unauthorized() {
            self.sign_out().await;
        } else if let Some(notice) = fallback {
            self.notify(notice);
        }
    }

    pub(crate) async fn sign_out(&self) {
        {
            let mut state = self.state.write().await;
            if state.signed_out {
                return;
            }
            state.signed_out = true;
        }
        if let Err(e) = self.credentials.clear() {
            tracing::warn!("[Auth] Failed to discard credential: {}", e);
        }
        tracing::info!("[Auth] Credential rejected; signed out");
        self.notify(Notice::SignedOut);
    }
}
