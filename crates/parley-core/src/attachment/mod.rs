//! Staged attachment domain module.
//!
//! - `model`: the file handle picked by the user (`FileUpload`), media
//!   classification (`MediaKind`), and the per-kind lifecycle types
//! - `slot`: the single staged-attachment slot with its generation counter

mod model;
mod slot;

pub use model::{
    DOCUMENT_EXTENSIONS, DocumentAttachment, DocumentState, FileUpload, ImageAttachment,
    MediaKind, StagedAttachment,
};
pub use slot::{AttachmentGeneration, AttachmentSlot};
