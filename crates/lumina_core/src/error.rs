//! # Core Error Types

use thiserror::Error;

/// Errors reported by the worker pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool shut down before the job produced a result.
    #[error("worker pool disconnected before the job completed")]
    Disconnected,

    /// The job panicked while running on a worker.
    #[error("job panicked on worker thread: {0}")]
    Panicked(String),
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
