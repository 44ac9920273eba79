//! Background execution context.
//!
//! Jobs execute on a rayon worker pool. Each finished job is sent back over a
//! crossbeam channel and completed by whichever thread drains that channel,
//! which is always the thread that owns the context: the context is neither
//! `Send` nor `Sync`.

use crossbeam::channel::{unbounded, Receiver, Sender};
use log::{debug, info, trace};
use std::cell::Cell;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{Error, Result};
use crate::job::{Job, JobState};

/// Extract panic info from panic value
pub fn extract_panic_info(panic_err: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic_err.downcast_ref::<&str>() {
        format!("Panic with message: {}", s)
    } else if let Some(s) = panic_err.downcast_ref::<String>() {
        format!("Panic with message: {}", s)
    } else {
        "Unknown panic occurred".to_string()
    }
}

/// Worker pool plus an origin-thread completion queue
pub struct ExecutionContext {
    pool: rayon::ThreadPool,
    sender: Sender<Box<dyn Job>>,
    receiver: Receiver<Box<dyn Job>>,
    in_flight: Cell<usize>,
    _origin: PhantomData<*const ()>,
}

impl ExecutionContext {
    /// Start a worker pool with `threads` threads (0 = one per CPU)
    pub fn new(threads: usize) -> Result<Self> {
        let threads = if threads == 0 {
            num_cpus::get()
        } else {
            threads
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("phash-worker-{}", i))
            .build()?;
        info!("Using {} threads for image hashing", threads);

        let (sender, receiver) = unbounded();

        Ok(Self {
            pool,
            sender,
            receiver,
            in_flight: Cell::new(0),
            _origin: PhantomData,
        })
    }

    /// Hand a job to the worker pool. Returns immediately.
    pub fn submit(&self, mut job: Box<dyn Job>) {
        self.in_flight.set(self.in_flight.get() + 1);
        debug!("Queued hash job for '{}'", job.file().display());

        let sender = self.sender.clone();
        self.pool.spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| job.execute()));
            if let Err(panic_err) = outcome {
                job.fail(Error::Algorithm(extract_panic_info(panic_err)));
            }

            // The receiver outlives every in-flight job
            let _ = sender.send(job);
        });
    }

    /// Complete every job that has already finished, without blocking.
    /// Returns the number of handlers invoked.
    pub fn poll(&self) -> usize {
        let mut delivered = 0;
        while let Ok(job) = self.receiver.try_recv() {
            self.finish(job);
            delivered += 1;
        }
        delivered
    }

    /// Block until one job finishes and complete it. Returns `false` at once
    /// when nothing is in flight.
    pub fn run_next(&self) -> bool {
        if self.in_flight.get() == 0 {
            return false;
        }
        match self.receiver.recv() {
            Ok(job) => {
                self.finish(job);
                true
            }
            Err(_) => false,
        }
    }

    /// Block until every submitted job has been completed.
    /// Returns the number of handlers invoked.
    pub fn run_until_idle(&self) -> usize {
        let mut delivered = 0;
        while self.run_next() {
            delivered += 1;
        }
        delivered
    }

    /// Jobs submitted but not yet completed
    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    /// Size of the worker pool
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn finish(&self, job: Box<dyn Job>) {
        self.in_flight.set(self.in_flight.get() - 1);
        trace!(
            "'{}': {:?} -> {:?}",
            job.file().display(),
            job.state(),
            JobState::Completed
        );
        job.complete();
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        let pending = self.in_flight.get();
        if pending > 0 {
            debug!("Draining {} in-flight hash jobs before shutdown", pending);
            self.run_until_idle();
        }
    }
}
