//! The upload lifecycle as an explicit state machine.
//!
//! [`UploadState`] holds everything a front end needs to render: the
//! selected model and a [`Phase`], which carries the error message or the
//! downloaded archive only in the phases where they exist.
//! All changes go through [`UploadState::apply`], a pure function from
//! `(state, event)` to the next state, so the lifecycle can be tested without
//! any network or UI.
//!
//! ```text
//!            SubmissionStarted              Succeeded
//!   Idle ─────────────────────▶ Processing ─────────▶ Complete
//!    ▲  ▲                          │                      │
//!    │  │ Reset                    │ Failed               │ Reset
//!    │  └───────── Error ◀─────────┘                      │
//!    │               │ SubmissionStarted ─▶ Processing     │
//!    └───────────────┴─────────────────────────────────────┘
//! ```

use crate::error::UploadError;
use crate::model::ModelId;
use crate::pipeline::artifact::DownloadArtifact;
use serde::{Serialize, Serializer};
use std::fmt;

/// Where the upload lifecycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    #[default]
    Idle,
    Processing,
    Complete,
    Error,
}

impl UploadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadStatus::Idle => "idle",
            UploadStatus::Processing => "processing",
            UploadStatus::Complete => "complete",
            UploadStatus::Error => "error",
        }
    }

    /// Whether a new file may be submitted from this status.
    pub fn accepts_files(self) -> bool {
        matches!(self, UploadStatus::Idle | UploadStatus::Error)
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// A file was accepted and the request is about to be sent.
    SubmissionStarted,
    /// The user picked a model.
    ModelSelected(ModelId),
    /// A dropped file failed validation; carries the notice to show.
    FileRejected(String),
    /// The endpoint returned an archive.
    Succeeded(DownloadArtifact),
    /// The attempt failed; carries the message to show.
    Failed(String),
    /// The user asked to start over.
    Reset,
}

impl UploadEvent {
    pub fn name(&self) -> &'static str {
        match self {
            UploadEvent::SubmissionStarted => "submission",
            UploadEvent::ModelSelected(_) => "model selection",
            UploadEvent::FileRejected(_) => "file rejection",
            UploadEvent::Succeeded(_) => "success",
            UploadEvent::Failed(_) => "failure",
            UploadEvent::Reset => "reset",
        }
    }
}

/// The lifecycle phase, with the data that only exists in that phase.
#[derive(Debug, Clone)]
pub enum Phase {
    /// Waiting for a file. `notice` is the rejection text for a refused
    /// drop, empty otherwise.
    Idle { notice: String },
    Processing,
    Complete(DownloadArtifact),
    Error { message: String },
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle {
            notice: String::new(),
        }
    }
}

impl Phase {
    pub fn status(&self) -> UploadStatus {
        match self {
            Phase::Idle { .. } => UploadStatus::Idle,
            Phase::Processing => UploadStatus::Processing,
            Phase::Complete(_) => UploadStatus::Complete,
            Phase::Error { .. } => UploadStatus::Error,
        }
    }
}

/// Snapshot of one upload session.
#[derive(Debug, Clone, Default)]
pub struct UploadState {
    pub phase: Phase,
    pub model: ModelId,
}

impl Serialize for UploadState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Snapshot<'a> {
            status: UploadStatus,
            model: ModelId,
            error_message: &'a str,
        }

        Snapshot {
            status: self.status(),
            model: self.model,
            error_message: self.error_message(),
        }
        .serialize(serializer)
    }
}

impl UploadState {
    /// Fresh idle state with the given model selected.
    pub fn new(model: ModelId) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    pub fn status(&self) -> UploadStatus {
        self.phase.status()
    }

    /// Empty unless the last attempt failed or a dropped file was rejected.
    pub fn error_message(&self) -> &str {
        match &self.phase {
            Phase::Idle { notice } => notice,
            Phase::Error { message } => message,
            Phase::Processing | Phase::Complete(_) => "",
        }
    }

    /// The downloaded archive, present only when complete.
    pub fn artifact(&self) -> Option<&DownloadArtifact> {
        match &self.phase {
            Phase::Complete(artifact) => Some(artifact),
            _ => None,
        }
    }

    /// Compute the state that follows `event`.
    ///
    /// Illegal pairs return [`UploadError::InvalidTransition`] (or
    /// [`UploadError::Busy`] for a submission while processing); the
    /// caller's copy of the state is left as it was.
    pub fn apply(self, event: UploadEvent) -> Result<UploadState, UploadError> {
        use Phase as P;
        use UploadEvent as E;

        let UploadState { phase, model } = self;
        let phase = match (phase, event) {
            (P::Idle { .. } | P::Error { .. }, E::SubmissionStarted) => P::Processing,
            (P::Processing, E::SubmissionStarted) => return Err(UploadError::Busy),

            // Ignored while a request is in flight.
            (P::Processing, E::ModelSelected(_)) => P::Processing,
            (phase, E::ModelSelected(selected)) => {
                return Ok(UploadState {
                    phase,
                    model: selected,
                })
            }

            (P::Idle { .. }, E::FileRejected(notice)) => P::Idle { notice },
            (P::Error { .. }, E::FileRejected(message)) => P::Error { message },
            (P::Processing, E::FileRejected(_)) => return Err(UploadError::Busy),

            (P::Processing, E::Succeeded(artifact)) => P::Complete(artifact),
            (P::Processing, E::Failed(message)) => P::Error { message },

            (P::Complete(_) | P::Error { .. }, E::Reset) => P::default(),

            (phase, event) => {
                return Err(UploadError::invalid_transition(phase.status(), &event))
            }
        };
        Ok(UploadState { phase, model })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(bytes: &[u8]) -> DownloadArtifact {
        DownloadArtifact::new(bytes.to_vec(), "results.zip", None)
    }

    fn processing() -> UploadState {
        UploadState::default()
            .apply(UploadEvent::SubmissionStarted)
            .unwrap()
    }

    #[test]
    fn submission_moves_idle_to_processing() {
        let s = processing();
        assert_eq!(s.status(), UploadStatus::Processing);
        assert!(s.error_message().is_empty());
    }

    #[test]
    fn submission_from_error_clears_message() {
        let s = processing()
            .apply(UploadEvent::Failed("bad scan".into()))
            .unwrap()
            .apply(UploadEvent::SubmissionStarted)
            .unwrap();
        assert_eq!(s.status(), UploadStatus::Processing);
        assert_eq!(s.error_message(), "");
    }

    #[test]
    fn second_submission_is_busy() {
        let err = processing()
            .apply(UploadEvent::SubmissionStarted)
            .unwrap_err();
        assert!(matches!(err, UploadError::Busy));
    }

    #[test]
    fn submission_from_complete_needs_reset() {
        let s = processing()
            .apply(UploadEvent::Succeeded(artifact(b"PK")))
            .unwrap();
        let err = s.apply(UploadEvent::SubmissionStarted).unwrap_err();
        assert!(matches!(
            err,
            UploadError::InvalidTransition {
                from: UploadStatus::Complete,
                ..
            }
        ));
    }

    #[test]
    fn success_stores_artifact() {
        let s = processing()
            .apply(UploadEvent::Succeeded(artifact(b"zip-bytes")))
            .unwrap();
        assert_eq!(s.status(), UploadStatus::Complete);
        assert_eq!(s.artifact().unwrap().bytes(), b"zip-bytes");
    }

    #[test]
    fn archive_exists_only_in_complete_phase() {
        let s = processing();
        assert!(s.artifact().is_none());

        let s = s.apply(UploadEvent::Succeeded(artifact(b"PK"))).unwrap();
        assert!(matches!(&s.phase, Phase::Complete(a) if a.bytes() == b"PK"));
        assert_eq!(s.error_message(), "");

        let s = s.apply(UploadEvent::Reset).unwrap();
        assert!(matches!(&s.phase, Phase::Idle { notice } if notice.is_empty()));
    }

    #[test]
    fn failure_records_message() {
        let s = processing()
            .apply(UploadEvent::Failed("bad scan".into()))
            .unwrap();
        assert_eq!(s.status(), UploadStatus::Error);
        assert_eq!(s.error_message(), "bad scan");
        assert!(s.artifact().is_none());
    }

    #[test]
    fn model_selection_ignored_while_processing() {
        let s = processing()
            .apply(UploadEvent::ModelSelected(ModelId::Gemini3Pro))
            .unwrap();
        assert_eq!(s.model, ModelId::DEFAULT);
    }

    #[test]
    fn model_selection_allowed_otherwise() {
        let s = UploadState::default()
            .apply(UploadEvent::ModelSelected(ModelId::Gemini25Pro))
            .unwrap();
        assert_eq!(s.model, ModelId::Gemini25Pro);

        let s = processing()
            .apply(UploadEvent::Failed("x".into()))
            .unwrap()
            .apply(UploadEvent::ModelSelected(ModelId::Gemini20Flash))
            .unwrap();
        assert_eq!(s.model, ModelId::Gemini20Flash);
        assert_eq!(s.status(), UploadStatus::Error);
    }

    #[test]
    fn rejection_keeps_idle_status() {
        let s = UploadState::default()
            .apply(UploadEvent::FileRejected("Please upload a PDF file.".into()))
            .unwrap();
        assert_eq!(s.status(), UploadStatus::Idle);
        assert_eq!(s.error_message(), "Please upload a PDF file.");
    }

    #[test]
    fn reset_only_from_complete_or_error() {
        assert!(UploadState::default().apply(UploadEvent::Reset).is_err());
        assert!(processing().apply(UploadEvent::Reset).is_err());

        let s = processing()
            .apply(UploadEvent::Failed("boom".into()))
            .unwrap()
            .apply(UploadEvent::Reset)
            .unwrap();
        assert_eq!(s.status(), UploadStatus::Idle);
        assert!(s.error_message().is_empty());

        let s = processing()
            .apply(UploadEvent::Succeeded(artifact(b"PK")))
            .unwrap()
            .apply(UploadEvent::Reset)
            .unwrap();
        assert_eq!(s.status(), UploadStatus::Idle);
        assert!(s.artifact().is_none());
    }

    #[test]
    fn outcome_events_outside_processing_are_invalid() {
        assert!(UploadState::default()
            .apply(UploadEvent::Succeeded(artifact(b"PK")))
            .is_err());
        assert!(UploadState::default()
            .apply(UploadEvent::Failed("x".into()))
            .is_err());
    }

    #[test]
    fn model_survives_reset() {
        let s = UploadState::new(ModelId::Gemini25Pro)
            .apply(UploadEvent::SubmissionStarted)
            .unwrap()
            .apply(UploadEvent::Failed("x".into()))
            .unwrap()
            .apply(UploadEvent::Reset)
            .unwrap();
        assert_eq!(s.model, ModelId::Gemini25Pro);
    }
}
