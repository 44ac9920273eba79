//! Job submission facade.
//!
//! [`Phasher`] is the public entry point. The callback methods mirror a
//! native addon's `imageHash(path, cb)` / `imageHashMH(path, cb)` pair; the
//! `*_pending` methods wrap them in a single-shot [`Pending`] result.

use crossbeam::channel::{bounded, Receiver, TryRecvError};
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

use crate::algorithms::{DefaultAlgorithms, HashAlgorithms};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::executor::ExecutionContext;
use crate::job::{ImageHashJob, MhImageHashJob};

/// Representation requested from [`Phasher::image_hash_pending`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashFormat {
    /// The 8-byte hash buffer
    #[default]
    Buffer,
    /// The hash as a base-10 string, for callers without 64-bit integers
    Decimal,
}

/// A DCT hash in the representation asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashValue {
    Buffer(Vec<u8>),
    Decimal(String),
}

/// Result of a submitted job, delivered when the owning context completes it
pub struct Pending<T> {
    receiver: Receiver<Result<T>>,
}

impl<T> Pending<T> {
    /// Take the result if its handler has already run
    pub fn try_take(&self) -> Option<Result<T>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Error::Undelivered)),
        }
    }

    /// Drive `phasher`'s completion loop on this thread until the result arrives.
    ///
    /// `phasher` must be the one that created this result. Any other phasher
    /// runs out of work without delivering it, and this returns
    /// [`Error::Undelivered`].
    pub fn wait(self, phasher: &Phasher) -> Result<T> {
        loop {
            if let Some(result) = self.try_take() {
                return result;
            }
            if !phasher.context().run_next() {
                return self.try_take().unwrap_or(Err(Error::Undelivered));
            }
        }
    }
}

/// Computes perceptual hashes off the caller's thread
pub struct Phasher {
    config: Config,
    algorithms: Arc<dyn HashAlgorithms>,
    context: ExecutionContext,
}

impl Phasher {
    /// Create a new Phasher with the built-in hash primitives
    pub fn new(config: Config) -> Result<Self> {
        Self::with_algorithms(config, Arc::new(DefaultAlgorithms))
    }

    /// Create a new Phasher around caller-supplied hash primitives
    pub fn with_algorithms(config: Config, algorithms: Arc<dyn HashAlgorithms>) -> Result<Self> {
        config.validate()?;
        let context = ExecutionContext::new(config.worker_threads())?;

        Ok(Self {
            config,
            algorithms,
            context,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Queue a 64-bit DCT hash of `path`.
    ///
    /// `on_complete` runs exactly once, on this thread, with
    /// `(error, 8-byte hash buffer, decimal string)`.
    pub fn image_hash<P, F>(&self, path: P, on_complete: F)
    where
        P: Into<PathBuf>,
        F: FnOnce(Option<Error>, Vec<u8>, String) + Send + 'static,
    {
        let path = path.into();
        debug!("imageHash request: {}", path.display());
        self.context.submit(Box::new(ImageHashJob::new(
            path,
            Arc::clone(&self.algorithms),
            Box::new(on_complete),
        )));
    }

    /// Queue a multi-resolution hash of `path`.
    ///
    /// `on_complete` runs exactly once, on this thread, with
    /// `(error, hash buffer)`.
    pub fn image_hash_mh<P, F>(&self, path: P, on_complete: F)
    where
        P: Into<PathBuf>,
        F: FnOnce(Option<Error>, Vec<u8>) + Send + 'static,
    {
        let path = path.into();
        debug!("imageHashMH request: {}", path.display());
        self.context.submit(Box::new(MhImageHashJob::new(
            path,
            Arc::clone(&self.algorithms),
            self.config.mh_alpha,
            self.config.mh_level,
            Box::new(on_complete),
        )));
    }

    /// Queue a DCT hash and get its result as a [`Pending`]
    pub fn image_hash_pending<P: Into<PathBuf>>(
        &self,
        path: P,
        format: HashFormat,
    ) -> Pending<HashValue> {
        let (sender, receiver) = bounded(1);
        self.image_hash(path, move |error, buffer, decimal| {
            let result = match (error, format) {
                (Some(e), _) => Err(e),
                (None, HashFormat::Buffer) => Ok(HashValue::Buffer(buffer)),
                (None, HashFormat::Decimal) => Ok(HashValue::Decimal(decimal)),
            };
            let _ = sender.send(result);
        });
        Pending { receiver }
    }

    /// Queue a multi-resolution hash and get its result as a [`Pending`]
    pub fn image_hash_mh_pending<P: Into<PathBuf>>(&self, path: P) -> Pending<Vec<u8>> {
        let (sender, receiver) = bounded(1);
        self.image_hash_mh(path, move |error, buffer| {
            let result = match error {
                Some(e) => Err(e),
                None => Ok(buffer),
            };
            let _ = sender.send(result);
        });
        Pending { receiver }
    }

    /// Deliver every finished result without blocking
    pub fn poll(&self) -> usize {
        self.context.poll()
    }

    /// Block until every queued job has delivered its result
    pub fn run_until_idle(&self) -> usize {
        self.context.run_until_idle()
    }
}
