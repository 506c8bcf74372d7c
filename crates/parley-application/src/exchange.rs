//! Message exchange: one question out, one answer (or failure) back.

use chrono::Utc;
use parley_core::attachment::{AttachmentGeneration, DocumentState, FileUpload, StagedAttachment};
use std::sync::Arc;

use crate::context::ChatContext;
use crate::session_switch::SessionSwitchCoordinator;
use crate::state::SendRejection;

/// How a call to `send` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The placeholder was replaced with the answer.
    Answered,
    /// The placeholder was replaced with the failure text.
    Failed,
    /// The reply arrived after the transcript had been replaced; it was dropped.
    Discarded,
    /// Nothing was sent.
    Rejected(SendRejection),
}

/// What the send took from the staged attachment.
struct Outgoing {
    session_id: Option<String>,
    epoch: u64,
    generation: AttachmentGeneration,
    image: Option<Arc<FileUpload>>,
    with_document: bool,
}

pub(crate) struct MessageExchange {
    context: Arc<ChatContext>,
}

impl MessageExchange {
    pub(crate) fn new(context: Arc<ChatContext>) -> Self {
        Self { context }
    }

    /// Sends `question`, with the staged image if there is one.
    ///
    /// The placeholder is appended before the request goes out and is
    /// settled exactly once when it returns. Only one send runs at a time.
    pub(crate) async fn send(&self, question: &str) -> SendOutcome {
        let question = question.trim();
        if question.is_empty() {
            return SendOutcome::Rejected(SendRejection::BlankQuestion);
        }

        let outgoing = match self.begin(question).await {
            Ok(outgoing) => outgoing,
            Err(rejection) => {
                tracing::debug!("[Exchange] Send rejected: {:?}", rejection);
                return SendOutcome::Rejected(rejection);
            }
        };

        // Detached so the placeholder is settled even if the caller stops waiting.
        let delivery = tokio::spawn(Self::deliver(
            self.context.clone(),
            question.to_string(),
            outgoing,
        ));
        match delivery.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("[Exchange] Send task ended abnormally: {}", e);
                SendOutcome::Failed
            }
        }
    }

    /// Makes the request and settles the placeholder, the in-flight flag and
    /// the attachment with its result.
    async fn deliver(
        context: Arc<ChatContext>,
        question: String,
        outgoing: Outgoing,
    ) -> SendOutcome {
        let api = &context.chat_api;
        let session_id = outgoing.session_id.as_deref();
        let result = match &outgoing.image {
            Some(image) => {
                tracing::info!("[Exchange] Sending question with image '{}'", image.name);
                api.send_image(&question, image, session_id).await
            }
            None => {
                tracing::info!("[Exchange] Sending question (session: {:?})", session_id);
                api.send_text(&question, session_id).await
            }
        };

        let mut adopted = false;
        let outcome = {
            let mut state = context.state.write().await;
            if outgoing.image.is_some() {
                state.clear_attachment_if_current(outgoing.generation);
            }
            let current = state.transcript.epoch() == outgoing.epoch;

            let outcome = match &result {
                Ok(reply) => {
                    if outgoing.with_document {
                        state.clear_attachment_if_current(outgoing.generation);
                    }
                    if current {
                        state.transcript.resolve_pending(
                            reply.answer.clone(),
                            Utc::now(),
                            reply.reasoning_steps.clone(),
                        );
                        if state.active_session.is_none() {
                            if let Some(session_id) = &reply.session_id {
                                tracing::info!("[Exchange] Server started session {}", session_id);
                                state.active_session = Some(session_id.clone());
                                adopted = true;
                            }
                        }
                        SendOutcome::Answered
                    } else {
                        SendOutcome::Discarded
                    }
                }
                Err(e) => {
                    tracing::warn!("[Exchange] Send failed: {}", e);
                    if current {
                        state
                            .transcript
                            .fail_pending(context.settings.text.send_failure.clone());
                        SendOutcome::Failed
                    } else {
                        SendOutcome::Discarded
                    }
                }
            };
            state.sending = false;
            outcome
        };

        if let Err(e) = &result {
            context.report_failure(e, None).await;
        }
        if adopted {
            SessionSwitchCoordinator::new(context.clone())
                .refresh_sessions()
                .await;
        }
        outcome
    }

    /// Checks the guards and, if they pass, marks the send in flight and
    /// appends the placeholder.
    async fn begin(&self, question: &str) -> Result<Outgoing, SendRejection> {
        let mut state = self.context.state.write().await;
        state.check_send()?;
        state
            .transcript
            .begin_pending(
                question,
                self.context.settings.text.processing_placeholder.clone(),
                Utc::now(),
            )
            .map_err(|_| SendRejection::SendInFlight)?;
        state.sending = true;
        state.draft.clear();

        let (image, with_document) = match state.attachment() {
            Some(StagedAttachment::Image(image)) => (Some(image.file.clone()), false),
            Some(StagedAttachment::Document(document)) => (
                None,
                matches!(document.state, DocumentState::Processed { .. }),
            ),
            None => (None, false),
        };

        Ok(Outgoing {
            session_id: state.active_session.clone(),
            epoch: state.transcript.epoch(),
            generation: state.attachment_generation(),
            image,
            with_document,
        })
    }
}
