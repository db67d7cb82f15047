//! The upload controller: file intake, one request, four states.
//!
//! [`UploadController`] owns an [`UploadState`] and drives it through the
//! pure transitions in [`crate::state`]. A submission is one awaited call to
//! a [`ProcessingEndpoint`]; the state lock is only held to read or replace
//! the state, never across that call, so a second submission arriving while
//! the first is in flight sees `Processing` and is turned away with
//! [`UploadError::Busy`].

use crate::config::ClientConfig;
use crate::error::{UploadError, CANCELLED_MESSAGE, GENERIC_FAILURE_MESSAGE};
use crate::model::ModelId;
use crate::pipeline::artifact::DownloadArtifact;
use crate::pipeline::endpoint::{EndpointReply, HttpEndpoint, ProcessingEndpoint};
use crate::pipeline::input::UploadFile;
use crate::progress::{NoopObserver, SharedObserver};
use crate::state::{UploadEvent, UploadState, UploadStatus};
use crate::view::View;
use serde::Deserialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Error payload the endpoint sends with a non-success status.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error: Option<String>,
}

/// Mediates between file-input events and the processing endpoint.
pub struct UploadController {
    endpoint: Arc<dyn ProcessingEndpoint>,
    config: ClientConfig,
    state: Mutex<UploadState>,
    observer: SharedObserver,
}

impl std::fmt::Debug for UploadController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadController")
            .field("config", &self.config)
            .field("state", &*self.lock())
            .finish()
    }
}

impl UploadController {
    /// Controller talking to the HTTP endpoint named in `config`.
    pub fn new(config: ClientConfig) -> Result<Self, UploadError> {
        let endpoint = HttpEndpoint::new(&config)?;
        Ok(Self::with_endpoint(config, Arc::new(endpoint)))
    }

    /// Controller talking to any [`ProcessingEndpoint`].
    pub fn with_endpoint(config: ClientConfig, endpoint: Arc<dyn ProcessingEndpoint>) -> Self {
        Self {
            endpoint,
            state: Mutex::new(UploadState::new(config.default_model)),
            config,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attach an observer for lifecycle events.
    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// A copy of the whole state.
    pub fn snapshot(&self) -> UploadState {
        self.lock().clone()
    }

    pub fn status(&self) -> UploadStatus {
        self.lock().status()
    }

    pub fn selected_model(&self) -> ModelId {
        self.lock().model
    }

    pub fn error_message(&self) -> String {
        self.lock().error_message().to_string()
    }

    pub fn artifact(&self) -> Option<DownloadArtifact> {
        self.lock().artifact().cloned()
    }

    /// The one branch a front end should render right now.
    pub fn view(&self) -> View {
        View::from_state(&self.lock())
    }

    // ── Commands ─────────────────────────────────────────────────────────

    /// Select the model for the next submission.
    ///
    /// Returns `false`, leaving the selection unchanged, while a request is
    /// in flight.
    pub fn select_model(&self, model: ModelId) -> bool {
        match self.transition(UploadEvent::ModelSelected(model)) {
            Ok((from, _)) if from != UploadStatus::Processing => {
                debug!("Model set to {}", model);
                true
            }
            _ => {
                debug!("Ignoring model change to {} while processing", model);
                false
            }
        }
    }

    /// Like [`select_model`](Self::select_model) but from an identifier
    /// string, which must be one of [`ModelId::ALL`].
    pub fn select_model_str(&self, model: &str) -> Result<bool, UploadError> {
        let model: ModelId = model.parse()?;
        Ok(self.select_model(model))
    }

    /// Return to idle after a finished or failed attempt.
    ///
    /// Disallowed (and a no-op) from idle or processing.
    pub fn reset(&self) -> Result<(), UploadError> {
        self.transition(UploadEvent::Reset)?;
        debug!("Reset to idle");
        Ok(())
    }

    /// The "click to browse" path. A dismissed picker (`None`) does nothing.
    pub async fn pick_file(
        &self,
        file: Option<UploadFile>,
    ) -> Result<Option<DownloadArtifact>, UploadError> {
        match file {
            Some(file) => self.submit_file(file).await.map(Some),
            None => Ok(None),
        }
    }

    /// The drag-and-drop path: only the first item is considered, and only
    /// if it is declared as `application/pdf`.
    pub async fn accept_dropped_files(
        &self,
        files: Vec<UploadFile>,
    ) -> Result<DownloadArtifact, UploadError> {
        self.accept_dropped_files_with_cancel(files, CancellationToken::new())
            .await
    }

    /// [`accept_dropped_files`](Self::accept_dropped_files) with a
    /// cancellation token for the resulting request.
    pub async fn accept_dropped_files_with_cancel(
        &self,
        files: Vec<UploadFile>,
        cancel: CancellationToken,
    ) -> Result<DownloadArtifact, UploadError> {
        match files.into_iter().next() {
            Some(file) if file.is_pdf_typed() => self.submit_file_with_cancel(file, cancel).await,
            other => {
                let err = UploadError::NotAPdf {
                    media_type: other.map(|f| f.media_type().to_string()),
                };
                self.transition(UploadEvent::FileRejected(err.to_string()))?;
                warn!("Rejected dropped file: {:?}", err);
                self.observer.on_error(&err.to_string());
                Err(err)
            }
        }
    }

    /// Send `file` with the selected model and wait for the archive.
    ///
    /// Failures are recorded in the state (status `Error`, message set) and
    /// also returned. `Busy` and `InvalidTransition` leave the state alone.
    pub async fn submit_file(&self, file: UploadFile) -> Result<DownloadArtifact, UploadError> {
        self.submit_file_with_cancel(file, CancellationToken::new())
            .await
    }

    /// [`submit_file`](Self::submit_file), abandoning the request if
    /// `cancel` fires first.
    ///
    /// Dropping the returned future mid-request (an outer timeout, an
    /// aborted task) has the same effect as cancelling.
    pub async fn submit_file_with_cancel(
        &self,
        file: UploadFile,
        cancel: CancellationToken,
    ) -> Result<DownloadArtifact, UploadError> {
        let (_, started) = self.transition(UploadEvent::SubmissionStarted)?;
        let model = started.model;
        let start = Instant::now();

        info!(
            "Submitting {} ({} bytes) with model {}",
            file.file_name(),
            file.len(),
            model
        );
        self.observer
            .on_submission_start(file.file_name(), file.len(), model);

        let in_flight = InFlight::arm(self);
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(UploadError::Cancelled),
            reply = self.endpoint.process(&file, model) => {
                reply.and_then(|r| self.interpret(r))
            }
        };
        in_flight.disarm();

        match outcome {
            Ok(artifact) => {
                self.transition(UploadEvent::Succeeded(artifact.clone()))?;
                info!(
                    "Received {} ({} bytes) in {}ms",
                    artifact.suggested_name(),
                    artifact.len(),
                    start.elapsed().as_millis()
                );
                self.observer.on_complete(artifact.len());
                Ok(artifact)
            }
            Err(e) => {
                warn!("Submission of {} failed: {}", file.file_name(), e);
                let message = e.to_string();
                self.transition(UploadEvent::Failed(message.clone()))?;
                self.observer.on_error(&message);
                Err(e)
            }
        }
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, UploadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `event`, store the result and notify the observer.
    ///
    /// Returns the previous status and the new state.
    fn transition(&self, event: UploadEvent) -> Result<(UploadStatus, UploadState), UploadError> {
        let (from, next) = {
            let mut guard = self.lock();
            let from = guard.status();
            let next = guard.clone().apply(event)?;
            *guard = next.clone();
            (from, next)
        };
        let to = next.status();
        if from != to {
            debug!("Status {} -> {}", from, to);
            self.observer.on_status_change(from, to);
        }
        Ok((from, next))
    }

    /// Turn an endpoint reply into an archive or an error.
    fn interpret(&self, reply: EndpointReply) -> Result<DownloadArtifact, UploadError> {
        if reply.is_success() {
            return Ok(DownloadArtifact::new(
                reply.body,
                self.config.download_filename.clone(),
                reply.content_type,
            ));
        }
        Err(UploadError::Endpoint {
            status: reply.status,
            message: failure_message(&reply.body),
        })
    }
}

/// Fails the attempt as cancelled if a submission future is dropped before
/// its outcome is recorded, so the controller never stays in `Processing`.
struct InFlight<'a> {
    controller: &'a UploadController,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn arm(controller: &'a UploadController) -> Self {
        Self {
            controller,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!("Submission dropped while in flight");
        let failed = UploadEvent::Failed(CANCELLED_MESSAGE.to_string());
        if self.controller.transition(failed).is_ok() {
            self.controller.observer.on_error(CANCELLED_MESSAGE);
        }
    }
}

/// Extract the `error` field from a failure body, falling back to the
/// generic message when the body is not JSON or the field is missing/empty.
pub fn failure_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorPayload>(body) {
        Ok(ErrorPayload { error: Some(msg) }) if !msg.is_empty() => msg,
        Ok(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        Err(e) => {
            debug!("Unparsable error payload: {}", e);
            GENERIC_FAILURE_MESSAGE.to_string()
        }
    }
}
