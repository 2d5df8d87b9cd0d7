//! Error types for the work crate.

use thiserror::Error;

/// Errors that can occur while setting up parallel work.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkError {
    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),

    /// A pool was requested with no threads.
    #[error("Worker pool needs at least one thread")]
    NoThreads,
}

/// Result type for work operations.
pub type WorkResult<T> = Result<T, WorkError>;
