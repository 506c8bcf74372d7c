//! Attachment models.
//!
//! Images and documents follow different lifecycles, so each kind gets its
//! own type. An image never carries a server id; a document never carries
//! inline bytes once it has been uploaded.

use crate::error::{ParleyError, Result};
use std::sync::Arc;

/// File name suffixes accepted as documents (compared case-insensitively).
pub const DOCUMENT_EXTENSIONS: &[&str] = &[".pdf"];

/// A file picked by the user, read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Original file name
    pub name: String,
    /// Declared content type, if the picker reported one
    pub content_type: Option<String>,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type,
            bytes,
        }
    }

    /// Content type to send on the wire.
    pub fn mime_type(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or("application/octet-stream")
    }
}

/// The two supported media kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Document,
}

impl MediaKind {
    /// Classifies a picked file.
    ///
    /// An `image/*` content type wins; otherwise the name must end in one of
    /// [`DOCUMENT_EXTENSIONS`].
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedMediaType` for anything else.
    pub fn classify(file: &FileUpload) -> Result<Self> {
        let is_image = file
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("image/"));
        if is_image {
            return Ok(Self::Image);
        }

        let lower = file.name.to_lowercase();
        if DOCUMENT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            return Ok(Self::Document);
        }

        Err(ParleyError::unsupported_media_type(&file.name))
    }
}

/// An image staged for inline transport. Always ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub file: Arc<FileUpload>,
}

/// Server-side lifecycle of a document upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentState {
    /// Upload request in flight.
    Uploading,
    /// Upload accepted; the server is processing it.
    Uploaded { id: String },
    /// Processing finished; the document can be queried.
    Processed { id: String },
    /// The server reported a processing failure.
    Error { id: String },
}

impl DocumentState {
    /// Server id, once the upload has been accepted.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Uploading => None,
            Self::Uploaded { id } | Self::Processed { id } | Self::Error { id } => Some(id),
        }
    }
}

/// A document staged through the upload/processing pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentAttachment {
    pub name: String,
    pub state: DocumentState,
}

/// The single attachment candidate for the next send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedAttachment {
    Image(ImageAttachment),
    Document(DocumentAttachment),
}

impl StagedAttachment {
    pub fn image(file: FileUpload) -> Self {
        Self::Image(ImageAttachment {
            file: Arc::new(file),
        })
    }

    pub fn uploading_document(name: impl Into<String>) -> Self {
        Self::Document(DocumentAttachment {
            name: name.into(),
            state: DocumentState::Uploading,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Image(image) => &image.file.name,
            Self::Document(document) => &document.name,
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Image(_) => MediaKind::Image,
            Self::Document(_) => MediaKind::Document,
        }
    }

    /// Whether the attachment blocks both sending and picking a new file.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            Self::Document(DocumentAttachment {
                state: DocumentState::Uploading | DocumentState::Uploaded { .. },
                ..
            })
        )
    }

    /// Whether a send may go out with this attachment staged.
    pub fn is_send_ready(&self) -> bool {
        matches!(
            self,
            Self::Image(_)
                | Self::Document(DocumentAttachment {
                    state: DocumentState::Processed { .. },
                    ..
                })
        )
    }

    /// Short status label for the view.
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Image(_) => "ready",
            Self::Document(document) => match document.state {
                DocumentState::Uploading => "uploading",
                DocumentState::Uploaded { .. } => "uploaded",
                DocumentState::Processed { .. } => "processed",
                DocumentState::Error { .. } => "error",
            },
        }
    }

    /// Display name with a long stem shortened to 15 characters.
    pub fn short_name(&self) -> String {
        shorten_file_name(self.name(), 15)
    }
}

fn shorten_file_name(name: &str, max_stem: usize) -> String {
    let Some(dot) = name.rfind('.') else {
        return name.to_string();
    };
    let (stem, ext) = (&name[..dot], &name[dot + 1..]);
    if stem.chars().count() <= max_stem {
        return name.to_string();
    }
    let head: String = stem.chars().take(max_stem).collect();
    format!("{head}...{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content_type: Option<&str>) -> FileUpload {
        FileUpload::new(name, content_type.map(str::to_string), vec![1, 2, 3])
    }

    #[test]
    fn test_classify_image_by_content_type() {
        let kind = MediaKind::classify(&file("photo.bin", Some("image/png"))).unwrap();
        assert_eq!(kind, MediaKind::Image);
    }

    #[test]
    fn test_classify_document_by_extension_case_insensitive() {
        let kind = MediaKind::classify(&file("Hop_Dong.PDF", Some("application/pdf"))).unwrap();
        assert_eq!(kind, MediaKind::Document);
    }

    #[test]
    fn test_classify_rejects_other_files() {
        let err = MediaKind::classify(&file("notes.docx", None)).unwrap_err();
        assert_eq!(err, ParleyError::unsupported_media_type("notes.docx"));
    }

    #[test]
    fn test_blocking_and_send_ready_by_state() {
        let uploading = StagedAttachment::uploading_document("a.pdf");
        assert!(uploading.is_blocking());
        assert!(!uploading.is_send_ready());

        let processed = StagedAttachment::Document(DocumentAttachment {
            name: "a.pdf".into(),
            state: DocumentState::Processed { id: "f1".into() },
        });
        assert!(!processed.is_blocking());
        assert!(processed.is_send_ready());

        let failed = StagedAttachment::Document(DocumentAttachment {
            name: "a.pdf".into(),
            state: DocumentState::Error { id: "f1".into() },
        });
        assert!(!failed.is_blocking());
        assert!(!failed.is_send_ready());

        let image = StagedAttachment::image(file("a.png", Some("image/png")));
        assert!(image.is_send_ready());
        assert_eq!(image.status_label(), "ready");
    }

    #[test]
    fn test_short_name() {
        let short = StagedAttachment::uploading_document("bo_luat_dan_su_2015_ban_day_du.pdf");
        assert_eq!(short.short_name(), "bo_luat_dan_su_...pdf");

        let kept = StagedAttachment::uploading_document("hop_dong.pdf");
        assert_eq!(kept.short_name(), "hop_dong.pdf");
    }
}
