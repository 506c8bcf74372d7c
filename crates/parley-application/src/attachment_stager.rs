//! Attachment staging.
//!
//! Images are ready as soon as they are staged. Documents are uploaded
//! first and then handed to a [`PollingSupervisor`] until the server has
//! processed them.

use parley_core::attachment::{
    AttachmentGeneration, DocumentAttachment, DocumentState, FileUpload, MediaKind,
    StagedAttachment,
};
use parley_core::error::{ParleyError, Result};
use parley_core::notice::Notice;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::context::ChatContext;
use crate::polling::{PollTarget, PollingSupervisor};

pub(crate) struct AttachmentStager {
    context: Arc<ChatContext>,
}

impl AttachmentStager {
    pub(crate) fn new(context: Arc<ChatContext>) -> Self {
        Self { context }
    }

    /// Validates and stages `file`, replacing any non-blocking attachment.
    ///
    /// For documents this awaits the upload request and returns the
    /// attachment in its `Uploaded` state; processing continues in the
    /// background.
    ///
    /// # Errors
    ///
    /// - `UnsupportedMediaType` if the file is neither an image nor a document
    /// - `Conflict` if a document is still uploading or processing, or the
    ///   attachment was cleared while the upload was in flight
    /// - whatever the upload request failed with
    pub(crate) async fn stage_file(&self, file: FileUpload) -> Result<StagedAttachment> {
        let kind = match MediaKind::classify(&file) {
            Ok(kind) => kind,
            Err(e) => {
                tracing::info!("[Attachment] Rejected '{}': unsupported type", file.name);
                self.context.notify(Notice::UnsupportedMediaType {
                    name: file.name.clone(),
                });
                return Err(e);
            }
        };

        match kind {
            MediaKind::Image => {
                let staged = StagedAttachment::image(file);
                self.stage_unless_blocked(staged.clone()).await?;
                tracing::info!("[Attachment] Image '{}' is ready", staged.name());
                Ok(staged)
            }
            MediaKind::Document => self.upload_document(file).await,
        }
    }

    /// Discards the staged attachment, if any.
    pub(crate) async fn clear(&self) -> Option<StagedAttachment> {
        let cleared = self.context.state.write().await.clear_attachment();
        if let Some(attachment) = &cleared {
            tracing::debug!("[Attachment] Cleared '{}'", attachment.name());
        }
        cleared
    }

    async fn upload_document(&self, file: FileUpload) -> Result<StagedAttachment> {
        let staged = StagedAttachment::uploading_document(file.name.clone());
        let (generation, cancel, session_id) = self.stage_unless_blocked(staged).await?;

        // Detached so the slot leaves `Uploading` even if the caller stops waiting.
        let upload = tokio::spawn(Self::finish_upload(
            self.context.clone(),
            file,
            generation,
            cancel,
            session_id,
        ));
        match upload.await {
            Ok(result) => result,
            Err(e) => Err(ParleyError::internal(format!("upload task ended abnormally: {e}"))),
        }
    }

    /// Uploads `file`, records the result against `generation` and starts
    /// the poller.
    async fn finish_upload(
        context: Arc<ChatContext>,
        file: FileUpload,
        generation: AttachmentGeneration,
        cancel: CancellationToken,
        session_id: Option<String>,
    ) -> Result<StagedAttachment> {
        let name = file.name.clone();

        tracing::info!("[Attachment] Uploading '{}'", name);
        let uploaded = context
            .chat_api
            .upload_document(&file, session_id.as_deref())
            .await;

        let id = match uploaded {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("[Attachment] Upload of '{}' failed: {}", name, e);
                let was_current = context
                    .state
                    .write()
                    .await
                    .clear_attachment_if_current(generation);
                if was_current {
                    context
                        .report_failure(&e, Some(Notice::UploadFailed { name }))
                        .await;
                } else {
                    context.report_failure(&e, None).await;
                }
                return Err(e);
            }
        };

        let document_state = DocumentState::Uploaded { id: id.clone() };
        let applied = context
            .state
            .write()
            .await
            .attachment
            .set_document_state(generation, document_state.clone());
        if !applied {
            tracing::debug!("[Attachment] '{}' was cleared during upload", name);
            return Err(ParleyError::conflict(format!(
                "attachment '{name}' was cleared before its upload finished"
            )));
        }

        tracing::info!("[Attachment] '{}' uploaded as {}", name, id);
        PollingSupervisor::spawn(
            context,
            PollTarget {
                attachment_id: id,
                name: name.clone(),
                generation,
                cancel,
            },
        );

        Ok(StagedAttachment::Document(DocumentAttachment {
            name,
            state: document_state,
        }))
    }

    /// Stages `staged` unless a document is in progress. Returns the new
    /// generation, its cancellation token and the active session.
    async fn stage_unless_blocked(
        &self,
        staged: StagedAttachment,
    ) -> Result<(AttachmentGeneration, CancellationToken, Option<String>)> {
        let mut state = self.context.state.write().await;
        let busy = state
            .attachment()
            .filter(|current| current.is_blocking())
            .map(|current| current.name().to_string());

        if let Some(busy) = busy {
            drop(state);
            tracing::info!(
                "[Attachment] Refused '{}': '{}' is still in progress",
                staged.name(),
                busy
            );
            self.context.notify(Notice::AttachmentBusy { name: busy.clone() });
            return Err(ParleyError::conflict(format!(
                "attachment '{busy}' is still uploading or processing"
            )));
        }

        let (generation, cancel) = state.stage_attachment(staged);
        Ok((generation, cancel, state.active_session.clone()))
    }
}
