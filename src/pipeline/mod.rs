//! Stages of a single submission.
//!
//! ```text
//! input ──▶ endpoint ──▶ artifact
//! (file)    (multipart)  (archive)
//! ```
//!
//! 1. [`input`]    — read the user's file and declare its media type
//! 2. [`endpoint`] — post file + model to the processing service; the only
//!    stage with network I/O
//! 3. [`artifact`] — hold the returned archive and save it to disk

pub mod artifact;
pub mod endpoint;
pub mod input;
