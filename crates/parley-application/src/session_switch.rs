//! Session switching and the cached session list.
//!
//! Switching replaces the transcript wholesale. Create, rename and delete go
//! through the session store and patch the cached list on success.

use parley_core::notice::{Notice, SessionOperation};
use std::sync::Arc;

use crate::context::ChatContext;
use crate::state::SwitchRejection;

/// How a session switch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The session is active with its loaded history.
    Activated,
    /// No session is active and the transcript is empty.
    Deactivated,
    /// The switch was refused; nothing changed.
    Rejected(SwitchRejection),
    /// The history could not be loaded; nothing changed.
    Failed,
    /// The load finished after the transcript had been replaced by
    /// something else; its result was dropped.
    Superseded,
}

/// How a session list update ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// Nothing to do (for example a blank title).
    Ignored,
    Failed,
}

pub(crate) struct SessionSwitchCoordinator {
    context: Arc<ChatContext>,
}

impl SessionSwitchCoordinator {
    pub(crate) fn new(context: Arc<ChatContext>) -> Self {
        Self { context }
    }

    /// Activates `session_id`, or deactivates when `None`.
    ///
    /// A staged attachment is left alone either way.
    pub(crate) async fn activate(&self, session_id: Option<&str>) -> SwitchOutcome {
        let Some(session_id) = session_id else {
            let mut state = self.context.state.write().await;
            if let Err(rejection) = state.check_switch() {
                tracing::debug!("[Sessions] Deactivation rejected: {:?}", rejection);
                return SwitchOutcome::Rejected(rejection);
            }
            state.deactivate();
            tracing::info!("[Sessions] Deactivated");
            return SwitchOutcome::Deactivated;
        };

        let epoch = {
            let mut state = self.context.state.write().await;
            if let Err(rejection) = state.check_switch() {
                tracing::debug!("[Sessions] Switch to {} rejected: {:?}", session_id, rejection);
                return SwitchOutcome::Rejected(rejection);
            }
            state.loading_session = true;
            state.transcript.epoch()
        };

        tracing::info!("[Sessions] Loading {}", session_id);
        let loaded = self.context.session_store.load(session_id).await;

        let mut state = self.context.state.write().await;
        state.loading_session = false;
        match loaded {
            Ok(detail) => {
                if state.transcript.epoch() != epoch {
                    tracing::debug!("[Sessions] Dropping stale load of {}", session_id);
                    return SwitchOutcome::Superseded;
                }
                tracing::info!(
                    "[Sessions] Activated {} ({} messages)",
                    session_id,
                    detail.messages.len()
                );
                state.transcript.replace_all(detail.messages);
                state.active_session = Some(detail.session.id.clone());
                if let Some(cached) = state.sessions.iter_mut().find(|s| s.id == detail.session.id)
                {
                    *cached = detail.session;
                }
                SwitchOutcome::Activated
            }
            Err(e) => {
                drop(state);
                tracing::warn!("[Sessions] Failed to load {}: {}", session_id, e);
                self.context
                    .report_failure(
                        &e,
                        Some(Notice::SessionLoadFailed {
                            session_id: session_id.to_string(),
                        }),
                    )
                    .await;
                SwitchOutcome::Failed
            }
        }
    }

    /// Reloads the cached session list.
    pub(crate) async fn refresh_sessions(&self) -> UpdateOutcome {
        match self.context.session_store.list().await {
            Ok(sessions) => {
                tracing::debug!("[Sessions] Listed {} sessions", sessions.len());
                self.context.state.write().await.sessions = sessions;
                UpdateOutcome::Applied
            }
            Err(e) => {
                tracing::warn!("[Sessions] Failed to list sessions: {}", e);
                self.context.report_failure(&e, None).await;
                UpdateOutcome::Failed
            }
        }
    }

    /// Creates a session and activates it with an empty transcript.
    pub(crate) async fn create_session(&self, title: Option<&str>) -> SwitchOutcome {
        if let Err(rejection) = self.context.state.read().await.check_switch() {
            return SwitchOutcome::Rejected(rejection);
        }

        let title = title.map(str::trim).filter(|t| !t.is_empty());
        let session = match self.context.session_store.create(title).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("[Sessions] Failed to create session: {}", e);
                self.context
                    .report_failure(
                        &e,
                        Some(Notice::SessionUpdateFailed {
                            operation: SessionOperation::Create,
                        }),
                    )
                    .await;
                return SwitchOutcome::Failed;
            }
        };

        let mut state = self.context.state.write().await;
        if let Err(rejection) = state.check_switch() {
            // Created but not switched to; keep it in the list.
            state.sessions.insert(0, session);
            return SwitchOutcome::Rejected(rejection);
        }
        tracing::info!("[Sessions] Created {}", session.id);
        state.active_session = Some(session.id.clone());
        state.transcript.clear();
        state.sessions.insert(0, session);
        SwitchOutcome::Activated
    }

    /// Renames a session. Blank titles are ignored.
    pub(crate) async fn rename_session(&self, session_id: &str, title: &str) -> UpdateOutcome {
        let title = title.trim();
        if title.is_empty() {
            return UpdateOutcome::Ignored;
        }

        if let Err(e) = self.context.session_store.rename(session_id, title).await {
            tracing::warn!("[Sessions] Failed to rename {}: {}", session_id, e);
            self.context
                .report_failure(
                    &e,
                    Some(Notice::SessionUpdateFailed {
                        operation: SessionOperation::Rename,
                    }),
                )
                .await;
            return UpdateOutcome::Failed;
        }

        let mut state = self.context.state.write().await;
        if let Some(session) = state.sessions.iter_mut().find(|s| s.id == session_id) {
            session.title = Some(title.to_string());
        }
        tracing::info!("[Sessions] Renamed {} to '{}'", session_id, title);
        UpdateOutcome::Applied
    }

    /// Deletes a session; deleting the active one deactivates.
    pub(crate) async fn delete_session(&self, session_id: &str) -> UpdateOutcome {
        if let Err(e) = self.context.session_store.delete(session_id).await {
            tracing::warn!("[Sessions] Failed to delete {}: {}", session_id, e);
            self.context
                .report_failure(
                    &e,
                    Some(Notice::SessionUpdateFailed {
                        operation: SessionOperation::Delete,
                    }),
                )
                .await;
            return UpdateOutcome::Failed;
        }

        let mut state = self.context.state.write().await;
        state.sessions.retain(|s| s.id != session_id);
        if state.active_session() == Some(session_id) {
            state.deactivate();
            tracing::info!("[Sessions] Deleted active session {}; deactivated", session_id);
        } else {
            tracing::info!("[Sessions] Deleted {}", session_id);
        }
        UpdateOutcome::Applied
    }

    /// Deletes every session and deactivates.
    pub(crate) async fn delete_all_sessions(&self) -> UpdateOutcome {
        if let Err(e) = self.context.session_store.delete_all().await {
            tracing::warn!("[Sessions] Failed to delete all sessions: {}", e);
            self.context
                .report_failure(
                    &e,
                    Some(Notice::SessionUpdateFailed {
                        operation: SessionOperation::Delete,
                    }),
                )
                .await;
            return UpdateOutcome::Failed;
        }

        let mut state = self.context.state.write().await;
        state.sessions.clear();
        state.deactivate();
        tracing::info!("[Sessions] Deleted all sessions");
        UpdateOutcome::Applied
    }
}
