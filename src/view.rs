//! What to show for a given state.
//!
//! [`View::from_state`] maps every [`UploadState`] to exactly one branch, so
//! a front end never renders the spinner and the download at once.

use crate::model::ModelId;
use crate::state::{Phase, UploadState};
use serde::Serialize;

/// The single branch a front end renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum View {
    /// Idle: the drop zone, with a rejection notice if a dropped file was refused.
    Dropzone { notice: Option<String> },
    /// A request is in flight.
    Processing { model: ModelId },
    /// The archive is ready to save.
    Complete { file_name: String, size: usize },
    /// The last attempt failed. The drop zone stays active for a retry.
    Error { message: String },
}

impl View {
    pub fn from_state(state: &UploadState) -> Self {
        match &state.phase {
            Phase::Idle { notice } => View::Dropzone {
                notice: (!notice.is_empty()).then(|| notice.clone()),
            },
            Phase::Processing => View::Processing { model: state.model },
            Phase::Complete(artifact) => View::Complete {
                file_name: artifact.suggested_name().to_string(),
                size: artifact.len(),
            },
            Phase::Error { message } => View::Error {
                message: message.clone(),
            },
        }
    }

    /// Whether a file can be dropped while this view is shown.
    pub fn accepts_files(&self) -> bool {
        matches!(self, View::Dropzone { .. } | View::Error { .. })
    }

    /// Plain-text rendering for a terminal.
    pub fn render(&self) -> String {
        match self {
            View::Dropzone { notice } => {
                let mut out = Glyph::Pdf.render();
                out.push_str("Drop a PDF file here, or pass its path.\n");
                if let Some(n) = notice {
                    out.push_str(&format!("! {n}\n"));
                }
                out
            }
            View::Processing { model } => {
                format!("Analysing with {model}…\nThis can take a few seconds.\n")
            }
            View::Complete { file_name, size } => {
                let mut out = Glyph::Spreadsheet.render();
                out.push_str(&format!("Conversion complete: {file_name} ({size} bytes)\n"));
                out
            }
            View::Error { message } => format!("An error occurred\n{message}\n"),
        }
    }
}

/// Decorative document glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Pdf,
    Spreadsheet,
}

impl Glyph {
    pub fn label(self) -> &'static str {
        match self {
            Glyph::Pdf => "PDF",
            Glyph::Spreadsheet => "XLS",
        }
    }

    /// A dog-eared page with the label on its last line.
    pub fn render(self) -> String {
        let body = match self {
            Glyph::Pdf => "│ ←── │",
            Glyph::Spreadsheet => "│ ═══ │",
        };
        format!("┌─────╲\n{body}\n{body}\n│ {} │\n└─────┘\n", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::artifact::DownloadArtifact;
    use crate::state::UploadEvent;

    #[test]
    fn every_status_maps_to_one_view() {
        let idle = UploadState::default();
        assert!(matches!(
            View::from_state(&idle),
            View::Dropzone { notice: None }
        ));

        let processing = idle.clone().apply(UploadEvent::SubmissionStarted).unwrap();
        assert_eq!(
            View::from_state(&processing),
            View::Processing {
                model: ModelId::DEFAULT
            }
        );

        let complete = processing
            .clone()
            .apply(UploadEvent::Succeeded(DownloadArtifact::new(
                vec![0; 4],
                "results.zip",
                None,
            )))
            .unwrap();
        assert_eq!(
            View::from_state(&complete),
            View::Complete {
                file_name: "results.zip".into(),
                size: 4
            }
        );

        let error = processing
            .apply(UploadEvent::Failed("bad scan".into()))
            .unwrap();
        assert_eq!(
            View::from_state(&error),
            View::Error {
                message: "bad scan".into()
            }
        );
    }

    #[test]
    fn idle_rejection_shows_notice() {
        let s = UploadState::default()
            .apply(UploadEvent::FileRejected("Please upload a PDF file.".into()))
            .unwrap();
        let v = View::from_state(&s);
        assert_eq!(
            v,
            View::Dropzone {
                notice: Some("Please upload a PDF file.".into())
            }
        );
        assert!(v.render().contains("Please upload a PDF file."));
    }

    #[test]
    fn only_dropzone_and_error_accept_files() {
        assert!(View::Dropzone { notice: None }.accepts_files());
        assert!(View::Error {
            message: "x".into()
        }
        .accepts_files());
        assert!(!View::Processing {
            model: ModelId::DEFAULT
        }
        .accepts_files());
        assert!(!View::Complete {
            file_name: "results.zip".into(),
            size: 1
        }
        .accepts_files());
    }

    #[test]
    fn glyphs_carry_labels() {
        assert!(Glyph::Pdf.render().contains("PDF"));
        assert!(Glyph::Spreadsheet.render().contains("XLS"));
    }

    #[test]
    fn serialises_with_tag() {
        let json = serde_json::to_value(View::Error {
            message: "bad scan".into(),
        })
        .unwrap();
        assert_eq!(json["view"], "error");
        assert_eq!(json["message"], "bad scan");
    }
}
