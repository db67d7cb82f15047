//! # pdf2xlsx
//!
//! Client for a PDF → Excel conversion service. Upload a PDF together with
//! an AI model identifier; the service extracts the document's content and
//! answers with a ZIP bundle of Excel files (`results.zip`).
//!
//! The extraction itself happens on the server. This crate owns the client
//! side: file intake, a four-state upload lifecycle, the multipart request
//! and the downloaded archive.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──submit──▶ Processing ──200──▶ Complete ──reset──▶ Idle
//!  ▲                   │
//!  │                   └─non-2xx / transport error / cancel──▶ Error
//!  └────────────────────────────reset──────────────────────────┘
//! ```
//!
//! Submissions are accepted from `Idle` and `Error`. A second submission
//! while one is in flight is rejected with [`UploadError::Busy`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2xlsx::{ClientConfig, ModelId, UploadController, UploadFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .endpoint_url("http://localhost:5328/api/process")
//!         .build()?;
//!     let controller = UploadController::new(config)?;
//!     controller.select_model(ModelId::Gemini25Pro);
//!
//!     let file = UploadFile::from_path("orders.pdf").await?;
//!     let archive = controller.accept_dropped_files(vec![file]).await?;
//!     archive.save_to("results.zip")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | The `pdf2xlsx` binary (clap, anyhow, indicatif, tracing-subscriber) |
//!
//! ## Models
//!
//! | Model | Notes |
//! |-------|-------|
//! | `gemini-2.0-flash` | |
//! | `gemini-2.5-flash-lite` | cheapest |
//! | `gemini-2.5-flash` | default, recommended |
//! | `gemini-2.5-pro` | |
//! | `gemini-3-pro` | |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod state;
pub mod view;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ClientConfig, ClientConfigBuilder, DEFAULT_DOWNLOAD_FILENAME, DEFAULT_ENDPOINT_URL,
};
pub use controller::{failure_message, UploadController};
pub use error::{
    ErrorKind, UploadError, CANCELLED_MESSAGE, GENERIC_FAILURE_MESSAGE, NOT_A_PDF_MESSAGE,
};
pub use model::ModelId;
pub use pipeline::artifact::DownloadArtifact;
pub use pipeline::endpoint::{EndpointReply, HttpEndpoint, ProcessingEndpoint};
pub use pipeline::input::{UploadFile, PDF_MEDIA_TYPE};
pub use progress::{NoopObserver, SharedObserver, StatusObserver};
pub use state::{Phase, UploadEvent, UploadState, UploadStatus};
pub use view::{Glyph, View};

/// Re-exported so callers can cancel a submission without depending on
/// `tokio-util` directly.
pub use tokio_util::sync::CancellationToken;
