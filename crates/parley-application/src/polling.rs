//! Polling supervisor for document processing status.
//!
//! One supervisor runs per uploaded document. It checks the status after an
//! initial delay and then at a fixed interval, up to a fixed number of
//! checks. It stops as soon as the document it works for is no longer the
//! staged attachment: the cancellation token wakes it from a sleep, and the
//! generation check keeps a late status result from touching a newer
//! attachment.

use parley_core::attachment::{AttachmentGeneration, DocumentState};
use parley_core::chat::DocumentStatus;
use parley_core::notice::Notice;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::context::ChatContext;

/// How a supervisor finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Processed,
    Failed,
    TimedOut,
    /// The attachment was cleared or replaced; nothing was changed.
    Stale,
    /// The credential was rejected while polling.
    SignedOut,
}

/// The document a supervisor is responsible for.
#[derive(Debug, Clone)]
pub(crate) struct PollTarget {
    pub(crate) attachment_id: String,
    pub(crate) name: String,
    pub(crate) generation: AttachmentGeneration,
    pub(crate) cancel: CancellationToken,
}

pub(crate) struct PollingSupervisor {
    context: Arc<ChatContext>,
}

impl PollingSupervisor {
    pub(crate) fn new(context: Arc<ChatContext>) -> Self {
        Self { context }
    }

    /// Starts supervising in the background.
    pub(crate) fn spawn(context: Arc<ChatContext>, target: PollTarget) -> JoinHandle<PollOutcome> {
        tokio::spawn(async move { Self::new(context).supervise(target).await })
    }

    pub(crate) async fn supervise(&self, target: PollTarget) -> PollOutcome {
        let policy = self.context.settings.poll;
        tracing::info!(
            "[Polling] Watching '{}' ({}), up to {} checks",
            target.name,
            target.attachment_id,
            policy.max_attempts
        );

        if !Self::pause(&target.cancel, policy.initial_delay).await {
            return PollOutcome::Stale;
        }

        for attempt in 1..=policy.max_attempts {
            if !self.is_current(&target).await {
                return PollOutcome::Stale;
            }

            match self
                .context
                .chat_api
                .document_status(&target.attachment_id)
                .await
            {
                Ok(DocumentStatus::Processed) => {
                    return self
                        .finish(
                            &target,
                            DocumentState::Processed {
                                id: target.attachment_id.clone(),
                            },
                            None,
                        )
                        .await
                        .unwrap_or(PollOutcome::Processed);
                }
                Ok(DocumentStatus::ErrorProcessing) => {
                    let notice = Notice::ProcessingFailed {
                        name: target.name.clone(),
                    };
                    return self
                        .finish(
                            &target,
                            DocumentState::Error {
                                id: target.attachment_id.clone(),
                            },
                            Some(notice),
                        )
                        .await
                        .unwrap_or(PollOutcome::Failed);
                }
                Ok(status) => {
                    tracing::debug!(
                        "[Polling] '{}' check {}/{}: {:?}",
                        target.name,
                        attempt,
                        policy.max_attempts,
                        status
                    );
                }
                Err(e) if e.is_unauthorized() => {
                    self.context.sign_out().await;
                    return PollOutcome::SignedOut;
                }
                Err(e) => {
                    tracing::warn!(
                        "[Polling] '{}' check {}/{} failed: {}",
                        target.name,
                        attempt,
                        policy.max_attempts,
                        e
                    );
                }
            }

            if attempt < policy.max_attempts && !Self::pause(&target.cancel, policy.interval).await {
                return PollOutcome::Stale;
            }
        }

        let timed_out = {
            let mut state = self.context.state.write().await;
            state.clear_attachment_if_current(target.generation)
        };
        if !timed_out {
            return PollOutcome::Stale;
        }
        tracing::warn!("[Polling] '{}' was not processed in time", target.name);
        self.context.notify(Notice::ProcessingTimeout { name: target.name });
        PollOutcome::TimedOut
    }

    /// Applies a terminal state. Returns `Some(Stale)` if the attachment moved on.
    async fn finish(
        &self,
        target: &PollTarget,
        document_state: DocumentState,
        notice: Option<Notice>,
    ) -> Option<PollOutcome> {
        let applied = {
            let mut state = self.context.state.write().await;
            state
                .attachment
                .set_document_state(target.generation, document_state.clone())
        };
        if !applied {
            tracing::debug!("[Polling] Dropping late result for '{}'", target.name);
            return Some(PollOutcome::Stale);
        }

        tracing::info!("[Polling] '{}' is now {:?}", target.name, document_state);
        if let Some(notice) = notice {
            self.context.notify(notice);
        }
        None
    }

    async fn is_current(&self, target: &PollTarget) -> bool {
        !target.cancel.is_cancelled()
            && self
                .context
                .state
                .read()
                .await
                .attachment
                .is_current(target.generation)
    }

    /// Sleeps for `duration`. Returns `false` if cancelled first.
    async fn pause(cancel: &CancellationToken, duration: Duration) -> bool {
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}
