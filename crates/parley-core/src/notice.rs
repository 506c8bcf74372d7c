//! User-visible notices raised by the orchestrator.

use serde::Serialize;
use std::fmt;

/// A session list change that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOperation {
    Create,
    Rename,
    Delete,
}

impl fmt::Display for SessionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Create => "tạo",
            Self::Rename => "đổi tên",
            Self::Delete => "xóa",
        };
        f.write_str(verb)
    }
}

/// Something the view should show the user as an alert.
///
/// The orchestrator never returns these as errors; it pushes them onto the
/// notice channel and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The picked file is neither an image nor a document.
    UnsupportedMediaType { name: String },
    /// A file was picked while a document is still uploading or processing.
    AttachmentBusy { name: String },
    /// The document upload request failed.
    UploadFailed { name: String },
    /// The server could not process the document.
    ProcessingFailed { name: String },
    /// The document was not processed within the polling budget.
    ProcessingTimeout { name: String },
    /// A session's history could not be loaded.
    SessionLoadFailed { session_id: String },
    /// Create, rename or delete of a session failed.
    SessionUpdateFailed { operation: SessionOperation },
    /// The credential was rejected and has been discarded.
    SignedOut,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedMediaType { .. } => {
                write!(f, "Chỉ hỗ trợ file ảnh (jpg, png, gif, webp) hoặc PDF.")
            }
            Self::AttachmentBusy { name } => write!(f, "Đang xử lý file {name}, vui lòng đợi."),
            Self::UploadFailed { .. } => write!(f, "Lỗi khi tải file lên."),
            Self::ProcessingFailed { name } => write!(f, "File processing failed: {name}"),
            Self::ProcessingTimeout { name } => write!(f, "File processing timeout: {name}"),
            Self::SessionLoadFailed { .. } => write!(f, "Không thể tải phiên làm việc."),
            Self::SessionUpdateFailed { operation } => {
                write!(f, "Không thể {operation} phiên làm việc.")
            }
            Self::SignedOut => write!(f, "Phiên đăng nhập đã hết hạn. Vui lòng đăng nhập lại."),
        }
    }
}
