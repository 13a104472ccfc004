use thiserror::Error;

use crate::alloc::arena::AllocError;

/// Error conditions surfaced by the habit index.
///
/// Every failure is returned directly to the caller; the core performs no
/// internal retry or recovery.
#[derive(Debug, Error)]
pub enum HabitError {
    #[error("arena exhausted: {0}")]
    OutOfMemory(#[from] AllocError),

    #[error("no habit named {name:?}")]
    NotFound { name: String },

    #[error("entry capacity reached for habit {name:?}")]
    CapacityExceeded { name: String },

    #[error("bucket count must be a power of two, got {0}")]
    InvalidBucketCount(usize),
}
