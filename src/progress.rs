//! Observer trait for upload lifecycle events.
//!
//! Inject an [`Arc<dyn StatusObserver>`] via
//! [`crate::controller::UploadController::with_observer`] to be told about
//! every status change as it happens. The CLI drives its spinner this way;
//! a GUI would repaint, a service would forward to a channel.
//!
//! # Example
//!
//! ```rust
//! use pdf2xlsx::{StatusObserver, UploadStatus};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct History(Mutex<Vec<UploadStatus>>);
//!
//! impl StatusObserver for History {
//!     fn on_status_change(&self, _from: UploadStatus, to: UploadStatus) {
//!         self.0.lock().unwrap().push(to);
//!     }
//! }
//!
//! let history: Arc<dyn StatusObserver> = Arc::new(History::default());
//! history.on_status_change(UploadStatus::Idle, UploadStatus::Processing);
//! ```

use crate::model::ModelId;
use crate::state::UploadStatus;
use std::sync::Arc;

/// Called by the controller as a submission progresses.
///
/// All methods have default no-op implementations so implementors only
/// override what they care about. Methods are called after the state has
/// been updated and never while the controller's state lock is held, so an
/// observer may call back into the controller.
pub trait StatusObserver: Send + Sync {
    /// Called whenever the status actually changes.
    fn on_status_change(&self, from: UploadStatus, to: UploadStatus) {
        let _ = (from, to);
    }

    /// Called just before the request is sent.
    ///
    /// # Arguments
    /// * `file_name` — original filename
    /// * `size`      — bytes being uploaded
    /// * `model`     — model identifier sent with the file
    fn on_submission_start(&self, file_name: &str, size: usize, model: ModelId) {
        let _ = (file_name, size, model);
    }

    /// Called when an archive has been received.
    fn on_complete(&self, archive_len: usize) {
        let _ = archive_len;
    }

    /// Called when the attempt fails, or a dropped file is rejected.
    fn on_error(&self, message: &str) {
        let _ = message;
    }
}

/// Observer that ignores everything. The default when none is configured.
pub struct NoopObserver;

impl StatusObserver for NoopObserver {}

/// Convenience alias for the type held by the controller.
pub type SharedObserver = Arc<dyn StatusObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Tracking {
        transitions: Mutex<Vec<(UploadStatus, UploadStatus)>>,
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
    }

    impl StatusObserver for Tracking {
        fn on_status_change(&self, from: UploadStatus, to: UploadStatus) {
            self.transitions.lock().unwrap().push((from, to));
        }

        fn on_submission_start(&self, _file_name: &str, _size: usize, _model: ModelId) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_complete(&self, _archive_len: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_error(&self, _message: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let o = NoopObserver;
        o.on_status_change(UploadStatus::Idle, UploadStatus::Processing);
        o.on_submission_start("a.pdf", 10, ModelId::DEFAULT);
        o.on_complete(42);
        o.on_error("boom");
    }

    #[test]
    fn tracking_observer_receives_events() {
        let t = Tracking::default();
        t.on_submission_start("a.pdf", 10, ModelId::DEFAULT);
        t.on_status_change(UploadStatus::Idle, UploadStatus::Processing);
        t.on_status_change(UploadStatus::Processing, UploadStatus::Error);
        t.on_error("bad scan");

        assert_eq!(t.starts.load(Ordering::SeqCst), 1);
        assert_eq!(t.errors.load(Ordering::SeqCst), 1);
        assert_eq!(t.completes.load(Ordering::SeqCst), 0);
        assert_eq!(
            *t.transitions.lock().unwrap(),
            vec![
                (UploadStatus::Idle, UploadStatus::Processing),
                (UploadStatus::Processing, UploadStatus::Error)
            ]
        );
    }

    #[test]
    fn arc_dyn_observer_works() {
        let o: SharedObserver = Arc::new(NoopObserver);
        o.on_complete(1);
    }
}
