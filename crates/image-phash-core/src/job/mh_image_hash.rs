use log::{debug, trace};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{probe_file, Job, JobState};
use crate::algorithms::HashAlgorithms;
use crate::error::Error;
use crate::logging::log_hash_error;
use crate::marshal::wrap_bytes;

/// Completion handler for the multi-resolution hash: `(error, hash buffer)`
pub type MhImageHashCallback = Box<dyn FnOnce(Option<Error>, Vec<u8>) + Send>;

/// Computes one multi-resolution hash for one file
pub struct MhImageHashJob {
    file: PathBuf,
    algorithms: Arc<dyn HashAlgorithms>,
    callback: MhImageHashCallback,
    alpha: f32,
    level: f32,
    state: JobState,
    error: Option<Error>,
    hash: Option<Vec<u8>>,
    hash_len: usize,
}

impl MhImageHashJob {
    pub fn new(
        file: PathBuf,
        algorithms: Arc<dyn HashAlgorithms>,
        alpha: f32,
        level: f32,
        callback: MhImageHashCallback,
    ) -> Self {
        Self {
            file,
            algorithms,
            callback,
            alpha,
            level,
            state: JobState::Created,
            error: None,
            hash: None,
            hash_len: 0,
        }
    }
}

impl Job for MhImageHashJob {
    fn file(&self) -> &Path {
        &self.file
    }

    fn state(&self) -> JobState {
        self.state
    }

    fn execute(&mut self) {
        debug_assert_eq!(self.state, JobState::Created);
        self.state = JobState::Executing;
        trace!("MH hash executing: {}", self.file.display());

        if let Err(e) = probe_file(&self.file) {
            self.fail(e);
            return;
        }

        match self.algorithms.mh_hash(&self.file, self.alpha, self.level) {
            Ok(hash) => {
                self.hash_len = hash.len();
                self.hash = Some(hash);
                self.state = JobState::Succeeded;
                debug!(
                    "MH hash of {} bytes for {}",
                    self.hash_len,
                    self.file.display()
                );
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: Error) {
        log_hash_error(&self.file, &error);
        self.error = Some(error);
        self.hash = None;
        self.hash_len = 0;
        self.state = JobState::Failed;
    }

    fn complete(self: Box<Self>) {
        debug_assert!(self.state.is_terminal());
        let MhImageHashJob {
            file,
            callback,
            error,
            hash,
            hash_len,
            ..
        } = *self;
        trace!("MH hash completing: {}", file.display());

        // The array moves into the outgoing buffer; failures send an empty one
        let buffer = wrap_bytes(hash.unwrap_or_default(), hash_len);
        callback(error, buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::test_support::FakeAlgorithms;
    use std::sync::mpsc;

    fn job_for(
        path: &Path,
        algorithms: Arc<FakeAlgorithms>,
    ) -> (MhImageHashJob, mpsc::Receiver<(Option<Error>, Vec<u8>)>) {
        let (tx, rx) = mpsc::channel();
        let job = MhImageHashJob::new(
            path.to_path_buf(),
            algorithms,
            2.0,
            1.0,
            Box::new(move |error, buffer| {
                tx.send((error, buffer)).unwrap();
            }),
        );
        (job, rx)
    }

    #[test]
    fn test_success_message_wraps_array_in_order() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let (mut job, rx) = job_for(file.path(), Arc::new(FakeAlgorithms::default()));

        job.execute();
        assert_eq!(job.state(), JobState::Succeeded);
        Box::new(job).complete();

        let (error, buffer) = rx.recv().unwrap();
        assert!(error.is_none());
        // Fake echoes alpha and level as its first two elements
        assert_eq!(buffer, vec![2, 1, 3, 4, 5]);
    }

    #[test]
    fn test_missing_file_yields_empty_buffer() {
        let algorithms = Arc::new(FakeAlgorithms::default());
        let (mut job, rx) = job_for(Path::new("fake/path/here"), algorithms.clone());

        job.execute();
        Box::new(job).complete();

        let (error, buffer) = rx.recv().unwrap();
        assert!(matches!(error, Some(Error::FileNotFound(_))));
        assert!(buffer.is_empty());
        assert_eq!(algorithms.calls(), 0);
    }

    #[test]
    fn test_algorithm_failure_yields_empty_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.bad");
        std::fs::write(&path, b"NOT AN IMAGE").unwrap();

        let (mut job, rx) = job_for(&path, Arc::new(FakeAlgorithms::default()));
        job.execute();
        assert_eq!(job.state(), JobState::Failed);
        Box::new(job).complete();

        let (error, buffer) = rx.recv().unwrap();
        assert!(matches!(error, Some(Error::Algorithm(_))));
        assert!(buffer.is_empty());
    }
}
