//! Hash jobs: one unit of asynchronous work per file.
//!
//! A job is built on the submitting thread, moved to a worker for
//! [`Job::execute`], then moved back and consumed by [`Job::complete`]. Since
//! the job is owned by exactly one party at a time, nothing can observe its
//! fields between the two phases.

mod image_hash;
mod mh_image_hash;

pub use image_hash::{ImageHashCallback, ImageHashJob};
pub use mh_image_hash::{MhImageHashCallback, MhImageHashJob};

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};

/// Lifecycle of a hash job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Executing,
    Succeeded,
    Failed,
    Completed,
}

impl JobState {
    /// Succeeded or Failed; the only states from which completion may run
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

/// A unit of work run by the [`ExecutionContext`](crate::ExecutionContext)
pub trait Job: Send + 'static {
    /// The file this job hashes
    fn file(&self) -> &Path;

    fn state(&self) -> JobState;

    /// Off-thread phase. Never returns an error: every failure is recorded
    /// on the job itself.
    fn execute(&mut self);

    /// Record a failure that escaped `execute`, such as a caught panic
    fn fail(&mut self, error: Error);

    /// Origin-thread phase. Builds the result message and invokes the
    /// completion handler exactly once.
    fn complete(self: Box<Self>);
}

/// Pre-flight probe: open the file read-only and close it again.
///
/// Keeps missing or unreadable paths away from the decoder entirely. The
/// caller logs the failure when it records it on the job.
pub(crate) fn probe_file(path: &Path) -> Result<()> {
    match File::open(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(Error::FileNotFound(path.to_path_buf()))
        }
        Err(e) => Err(Error::Unreadable {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
