//! The single staged-attachment slot.

use super::model::{DocumentState, StagedAttachment};

/// Identity of one staging of an attachment.
///
/// Every stage or clear produces a new generation; deferred work carries the
/// generation it was issued for and becomes a no-op once it no longer matches.
pub type AttachmentGeneration = u64;

/// Holds at most one staged attachment.
///
/// Staging replaces, never merges: the previous attachment (and any poller
/// working for it) is invalidated by the generation bump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentSlot {
    generation: AttachmentGeneration,
    current: Option<StagedAttachment>,
}

impl AttachmentSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&StagedAttachment> {
        self.current.as_ref()
    }

    pub fn generation(&self) -> AttachmentGeneration {
        self.generation
    }

    pub fn is_current(&self, generation: AttachmentGeneration) -> bool {
        self.current.is_some() && self.generation == generation
    }

    /// Whether an attachment blocks sending and staging.
    pub fn is_blocking(&self) -> bool {
        self.current.as_ref().is_some_and(StagedAttachment::is_blocking)
    }

    /// Whether a send may go out: nothing staged, or a ready attachment.
    pub fn allows_send(&self) -> bool {
        self.current
            .as_ref()
            .is_none_or(StagedAttachment::is_send_ready)
    }

    /// Stages an attachment, discarding any previous one.
    pub fn stage(&mut self, attachment: StagedAttachment) -> AttachmentGeneration {
        self.generation += 1;
        self.current = Some(attachment);
        self.generation
    }

    /// Discards the current attachment unconditionally.
    pub fn clear(&mut self) -> Option<StagedAttachment> {
        self.generation += 1;
        self.current.take()
    }

    /// Discards the attachment only if `generation` is still current.
    pub fn clear_if_current(&mut self, generation: AttachmentGeneration) -> bool {
        if self.is_current(generation) {
            self.clear();
            true
        } else {
            false
        }
    }

    /// Moves the document staged under `generation` to `state`.
    ///
    /// Returns `false` without touching anything when the generation is
    /// stale or the staged attachment is not a document.
    pub fn set_document_state(
        &mut self,
        generation: AttachmentGeneration,
        state: DocumentState,
    ) -> bool {
        if self.generation != generation {
            return false;
        }
        match self.current.as_mut() {
            Some(StagedAttachment::Document(document)) => {
                document.state = state;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::FileUpload;

    #[test]
    fn test_stage_replaces_and_invalidates_previous_generation() {
        let mut slot = AttachmentSlot::new();
        let first = slot.stage(StagedAttachment::uploading_document("a.pdf"));
        let second = slot.stage(StagedAttachment::uploading_document("b.pdf"));

        assert!(!slot.is_current(first));
        assert!(slot.is_current(second));
        assert!(!slot.set_document_state(first, DocumentState::Uploaded { id: "f1".into() }));
        assert_eq!(slot.current().unwrap().name(), "b.pdf");
        assert_eq!(slot.current().unwrap().status_label(), "uploading");
    }

    #[test]
    fn test_clear_invalidates_generation() {
        let mut slot = AttachmentSlot::new();
        let generation = slot.stage(StagedAttachment::uploading_document("a.pdf"));

        assert!(slot.clear().is_some());
        assert!(!slot.clear_if_current(generation));
        assert!(slot.allows_send());
    }

    #[test]
    fn test_document_state_ignored_for_images() {
        let mut slot = AttachmentSlot::new();
        let generation = slot.stage(StagedAttachment::image(FileUpload::new(
            "a.png",
            Some("image/png".into()),
            vec![0],
        )));

        assert!(!slot.set_document_state(generation, DocumentState::Processed { id: "x".into() }));
        assert!(slot.allows_send());
        assert!(!slot.is_blocking());
    }
}
