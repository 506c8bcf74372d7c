//! Reads a picked file from disk into a `FileUpload`.

use parley_core::attachment::FileUpload;
use parley_core::error::{ParleyError, Result};
use std::path::Path;

/// Loads `path` and guesses its content type from the extension.
///
/// The guess stands in for the content type a browser file picker reports.
pub async fn load_file_upload(path: &Path) -> Result<FileUpload> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ParleyError::io(format!("not a file: {}", path.display())))?;

    let bytes = tokio::fs::read(path).await?;
    let content_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string());

    tracing::debug!(
        "[FileLoader] Loaded {} ({} bytes, {:?})",
        name,
        bytes.len(),
        content_type
    );

    Ok(FileUpload::new(name, content_type, bytes))
}
