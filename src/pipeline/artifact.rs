//! The downloaded archive.
//!
//! The endpoint's success body is held in memory behind an `Arc` so the
//! controller, its observers and the caller can all hold the same artifact
//! without copying it.

use crate::error::UploadError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Binary response data plus the filename it should be saved under.
#[derive(Clone)]
pub struct DownloadArtifact {
    bytes: Arc<[u8]>,
    suggested_name: String,
    content_type: Option<String>,
}

impl std::fmt::Debug for DownloadArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadArtifact")
            .field("len", &self.bytes.len())
            .field("suggested_name", &self.suggested_name)
            .field("content_type", &self.content_type)
            .finish()
    }
}

impl DownloadArtifact {
    pub fn new(
        bytes: Vec<u8>,
        suggested_name: impl Into<String>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            suggested_name: suggested_name.into(),
            content_type,
        }
    }

    /// The archive exactly as the endpoint returned it.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn suggested_name(&self) -> &str {
        &self.suggested_name
    }

    /// `Content-Type` of the success response, if the endpoint sent one.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Whether the body starts with the ZIP local-file-header signature.
    pub fn looks_like_zip(&self) -> bool {
        self.bytes.starts_with(b"PK\x03\x04")
    }

    /// Write the archive to disk and return the final path.
    ///
    /// If `path` is an existing directory the suggested filename is
    /// appended. The write goes to a temporary file in the destination
    /// directory which is then persisted over the target, so a failed
    /// write never leaves a truncated archive behind.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<PathBuf, UploadError> {
        let path = path.as_ref();
        let target = if path.is_dir() {
            path.join(&self.suggested_name)
        } else {
            path.to_path_buf()
        };

        let write_failed = |source: std::io::Error| UploadError::OutputWriteFailed {
            path: target.clone(),
            source,
        };

        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(write_failed)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_failed)?;
        tmp.write_all(&self.bytes).map_err(write_failed)?;
        tmp.flush().map_err(write_failed)?;
        tmp.persist(&target).map_err(|e| write_failed(e.error))?;

        debug!("Saved {} bytes to {}", self.bytes.len(), target.display());
        Ok(target)
    }
}
