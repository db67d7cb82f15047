//! Error types for the pdf2xlsx client.
//!
//! Every failure the client can meet is a variant of [`UploadError`]. The
//! variants fall into three families, reported by [`UploadError::kind`]:
//!
//! * **Validation** — the input was refused before any byte hit the network
//!   (not a PDF, unknown model, a submission while one is in flight, …).
//! * **Transport** — the request was sent but did not produce an archive
//!   (non-success HTTP status, connection failure, timeout).
//! * **Unexpected** — everything else (cancellation, local write failure).
//!
//! The controller records an error's `Display` text as the user-facing
//! error message, so each variant's message is written for an end user.

use crate::state::{UploadEvent, UploadStatus};
use std::path::PathBuf;
use thiserror::Error;

/// Generic message shown when the endpoint fails without a usable payload.
pub const GENERIC_FAILURE_MESSAGE: &str = "Processing failed";

/// Rejection notice for dropped files that are not PDFs.
pub const NOT_A_PDF_MESSAGE: &str = "Please upload a PDF file.";

/// Message recorded when an in-flight submission is cancelled.
pub const CANCELLED_MESSAGE: &str = "Processing cancelled";

/// All errors returned by the pdf2xlsx library.
#[derive(Debug, Error)]
pub enum UploadError {
    // ── Validation errors ────────────────────────────────────────────────
    /// The dropped item was not declared as `application/pdf`.
    #[error("Please upload a PDF file.")]
    NotAPdf { media_type: Option<String> },

    /// The model identifier is not one of the allowed values.
    #[error("Unknown model '{model}'. Allowed: {allowed}")]
    UnknownModel { model: String, allowed: String },

    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// A submission is already in flight.
    #[error("A file is already being processed; wait for it to finish.")]
    Busy,

    /// The requested action is not allowed from the current status.
    #[error("Cannot apply {event} while {from}")]
    InvalidTransition {
        from: UploadStatus,
        event: &'static str,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Transport errors ─────────────────────────────────────────────────
    /// The endpoint answered with a non-success status.
    ///
    /// `message` is the server-provided `error` field, or
    /// [`GENERIC_FAILURE_MESSAGE`] when the body carried none.
    #[error("{message}")]
    Endpoint { status: u16, message: String },

    /// The request could not be completed (connection refused, timeout,
    /// truncated body, …).
    #[error("{detail}")]
    Request { detail: String },

    // ── Unexpected errors ────────────────────────────────────────────────
    /// The submission was cancelled before the endpoint answered.
    #[error("Processing cancelled")]
    Cancelled,

    /// Could not write the downloaded archive.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of an [`UploadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Validation,
    Transport,
    Unexpected,
}

impl UploadError {
    /// Which family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::NotAPdf { .. }
            | UploadError::UnknownModel { .. }
            | UploadError::FileNotFound { .. }
            | UploadError::PermissionDenied { .. }
            | UploadError::Busy
            | UploadError::InvalidTransition { .. }
            | UploadError::InvalidConfig(_) => ErrorKind::Validation,
            UploadError::Endpoint { .. } | UploadError::Request { .. } => ErrorKind::Transport,
            UploadError::Cancelled
            | UploadError::OutputWriteFailed { .. }
            | UploadError::Internal(_) => ErrorKind::Unexpected,
        }
    }

    /// HTTP status reported by the endpoint, if the failure came from one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            UploadError::Endpoint { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn invalid_transition(from: UploadStatus, event: &UploadEvent) -> Self {
        UploadError::InvalidTransition {
            from,
            event: event.name(),
        }
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(e: reqwest::Error) -> Self {
        let detail = if e.is_timeout() {
            format!("Request timed out: {e}")
        } else if e.is_connect() {
            format!("Could not reach the processing endpoint: {e}")
        } else {
            e.to_string()
        };
        UploadError::Request { detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_display_is_the_bare_message() {
        let e = UploadError::Endpoint {
            status: 500,
            message: "bad scan".into(),
        };
        assert_eq!(e.to_string(), "bad scan");
        assert_eq!(e.http_status(), Some(500));
        assert_eq!(e.kind(), ErrorKind::Transport);
    }

    #[test]
    fn not_a_pdf_uses_rejection_notice() {
        let e = UploadError::NotAPdf {
            media_type: Some("image/png".into()),
        };
        assert_eq!(e.to_string(), NOT_A_PDF_MESSAGE);
        assert_eq!(e.kind(), ErrorKind::Validation);
    }

    #[test]
    fn cancelled_display() {
        assert_eq!(UploadError::Cancelled.to_string(), CANCELLED_MESSAGE);
        assert_eq!(UploadError::Cancelled.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn invalid_transition_names_status_and_event() {
        let e = UploadError::invalid_transition(UploadStatus::Idle, &UploadEvent::Reset);
        let msg = e.to_string();
        assert!(msg.contains("reset"), "got: {msg}");
        assert!(msg.contains("idle"), "got: {msg}");
    }

    #[test]
    fn busy_is_validation() {
        assert_eq!(UploadError::Busy.kind(), ErrorKind::Validation);
        assert_eq!(UploadError::Busy.http_status(), None);
    }
}
