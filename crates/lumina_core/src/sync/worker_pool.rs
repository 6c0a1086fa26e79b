//! # Fixed-Size Worker Pool
//!
//! ```text
//!   spawn(job) ──> [job channel] ──> worker 0 ─┐
//!                                ──> worker 1 ─┼──> [one-shot result] ──> JobHandle::join
//!                                ──> worker N ─┘
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use crate::error::{PoolError, PoolResult};

/// A unit of work executed on a worker.
type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed number of worker threads consuming jobs in submission order.
///
/// Dropping the pool closes the job channel and joins every worker after
/// the queued jobs have run.
pub struct WorkerPool {
    /// Job channel. `None` once shutdown has started.
    sender: Option<Sender<Job>>,
    /// Worker threads.
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Starts a pool with `thread_count` workers (at least one).
    #[must_use]
    pub fn new(thread_count: usize) -> Self {
        let thread_count = thread_count.max(1);
        let (sender, receiver) = unbounded::<Job>();

        let workers = (0..thread_count)
            .filter_map(|index| {
                let receiver: Receiver<Job> = receiver.clone();
                let spawned = thread::Builder::new()
                    .name(format!("lumina-worker-{index}"))
                    .spawn(move || {
                        while let Ok(job) = receiver.recv() {
                            job();
                        }
                    });
                match spawned {
                    Ok(handle) => Some(handle),
                    Err(error) => {
                        tracing::warn!("Failed to start worker {}: {}", index, error);
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!("Worker pool started with {} threads", workers.len());

        Self {
            sender: Some(sender),
            workers,
        }
    }

    /// Returns the number of running workers.
    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Submits `job` and returns a handle that yields its result.
    ///
    /// A panic inside `job` is caught on the worker and surfaces as
    /// [`PoolError::Panicked`] from [`JobHandle::join`].
    pub fn spawn<F, R>(&self, job: F) -> JobHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (result_tx, result_rx) = bounded(1);

        let wrapped: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(job))
                .map_err(|payload| PoolError::Panicked(panic_message(payload.as_ref())));
            // The caller may have dropped its handle; nothing to report then.
            let _ = result_tx.send(outcome);
        });

        if let Some(sender) = &self.sender {
            if sender.send(wrapped).is_err() {
                tracing::warn!("Job submitted to a worker pool with no live workers");
            }
        }

        JobHandle { receiver: result_rx }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::warn!("Worker thread exited abnormally");
            }
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.workers.len())
            .finish()
    }
}

/// Handle to a job submitted to a [`WorkerPool`].
#[derive(Debug)]
pub struct JobHandle<R> {
    /// One-shot result channel.
    receiver: Receiver<PoolResult<R>>,
}

impl<R> JobHandle<R> {
    /// Blocks until the job finishes and returns its result.
    ///
    /// # Errors
    ///
    /// [`PoolError::Panicked`] if the job panicked, [`PoolError::Disconnected`]
    /// if the job was dropped without running.
    pub fn join(self) -> PoolResult<R> {
        self.receiver.recv().unwrap_or(Err(PoolError::Disconnected))
    }
}

/// Extracts a printable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
