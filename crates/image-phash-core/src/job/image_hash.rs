use log::{debug, trace};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{probe_file, Job, JobState};
use crate::algorithms::HashAlgorithms;
use crate::error::Error;
use crate::logging::log_hash_error;
use crate::marshal::reverse_bytes;

/// Completion handler for the DCT hash: `(error, hash buffer, decimal string)`
pub type ImageHashCallback = Box<dyn FnOnce(Option<Error>, Vec<u8>, String) + Send>;

/// Computes one 64-bit DCT hash for one file
pub struct ImageHashJob {
    file: PathBuf,
    algorithms: Arc<dyn HashAlgorithms>,
    callback: ImageHashCallback,
    state: JobState,
    error: Option<Error>,
    hash: u64,
    decimal: String,
}

impl ImageHashJob {
    pub fn new(
        file: PathBuf,
        algorithms: Arc<dyn HashAlgorithms>,
        callback: ImageHashCallback,
    ) -> Self {
        Self {
            file,
            algorithms,
            callback,
            state: JobState::Created,
            error: None,
            hash: 0,
            decimal: String::new(),
        }
    }
}

impl Job for ImageHashJob {
    fn file(&self) -> &Path {
        &self.file
    }

    fn state(&self) -> JobState {
        self.state
    }

    fn execute(&mut self) {
        debug_assert_eq!(self.state, JobState::Created);
        self.state = JobState::Executing;
        trace!("DCT hash executing: {}", self.file.display());

        if let Err(e) = probe_file(&self.file) {
            self.fail(e);
            return;
        }

        match self.algorithms.dct_hash(&self.file) {
            Ok(hash) => {
                self.hash = hash;
                self.decimal = hash.to_string();
                self.state = JobState::Succeeded;
                debug!("DCT hash {} for {}", self.decimal, self.file.display());
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: Error) {
        log_hash_error(&self.file, &error);
        self.error = Some(error);
        self.state = JobState::Failed;
    }

    fn complete(self: Box<Self>) {
        debug_assert!(self.state.is_terminal());
        let ImageHashJob {
            file,
            callback,
            error,
            hash,
            decimal,
            ..
        } = *self;
        trace!("DCT hash completing: {}", file.display());

        // An unset hash marshals as eight zero bytes and an empty decimal
        callback(error, reverse_bytes(hash), decimal);
    }
}
