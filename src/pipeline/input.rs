//! File intake: turn a user-supplied file into an [`UploadFile`].
//!
//! The media type is declared from the file extension, the same way a
//! browser fills in `File.type` for a dropped file. Content is never sniffed
//! to decide acceptance; [`UploadFile::looks_like_pdf`] is available for
//! callers that want to warn about a mislabelled file.

use crate::error::UploadError;
use bytes::Bytes;
use std::path::Path;
use tracing::debug;

/// Media type the drop zone accepts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Media type declared for anything without a known extension.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A file ready to be sent to the processing endpoint.
#[derive(Clone)]
pub struct UploadFile {
    file_name: String,
    media_type: String,
    bytes: Bytes,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    /// Wrap in-memory content with an explicit declared media type.
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a local file, declaring its media type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => UploadError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => UploadError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => UploadError::Internal(format!("reading {}: {e}", path.display())),
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());
        let media_type = media_type_for(path).to_string();

        debug!(
            "Read {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            media_type
        );

        Ok(Self {
            file_name,
            media_type,
            bytes: Bytes::from(bytes),
        })
    }

    /// Original filename, sent with the `file` form field.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Declared media type.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A shared handle on the content; cloning it does not copy the file.
    pub fn body(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the declared media type is exactly `application/pdf`.
    pub fn is_pdf_typed(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }

    /// Whether the content starts with the `%PDF` magic bytes.
    pub fn looks_like_pdf(&self) -> bool {
        self.bytes.starts_with(b"%PDF")
    }
}

/// Declared media type for a path, by extension (case-insensitive).
pub fn media_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => PDF_MEDIA_TYPE,
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_from_extension() {
        assert_eq!(media_type_for(Path::new("order.pdf")), PDF_MEDIA_TYPE);
        assert_eq!(media_type_for(Path::new("ORDER.PDF")), PDF_MEDIA_TYPE);
        assert_eq!(media_type_for(Path::new("order.png")), OCTET_STREAM);
        assert_eq!(media_type_for(Path::new("order")), OCTET_STREAM);
    }

    #[test]
    fn pdf_checks() {
        let f = UploadFile::new("a.pdf", PDF_MEDIA_TYPE, b"%PDF-1.7\n".to_vec());
        assert!(f.is_pdf_typed());
        assert!(f.looks_like_pdf());

        let f = UploadFile::new("a.pdf", "application/x-pdf", b"hello".to_vec());
        assert!(!f.is_pdf_typed());
        assert!(!f.looks_like_pdf());
    }

    #[tokio::test]
    async fn from_path_reads_and_declares_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("献立.pdf");
        std::fs::write(&path, b"%PDF-1.4 body").unwrap();

        let f = UploadFile::from_path(&path).await.unwrap();
        assert_eq!(f.file_name(), "献立.pdf");
        assert_eq!(f.media_type(), PDF_MEDIA_TYPE);
        assert_eq!(f.bytes(), b"%PDF-1.4 body");
    }

    #[test]
    fn body_shares_the_buffer() {
        let f = UploadFile::new("a.pdf", PDF_MEDIA_TYPE, b"%PDF-1.7\n".to_vec());
        let body = f.body();
        assert_eq!(body.as_ptr(), f.bytes().as_ptr());
        assert_eq!(body.len(), f.len());
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let err = UploadFile::from_path("/definitely/not/here.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::FileNotFound { .. }));
    }
}
