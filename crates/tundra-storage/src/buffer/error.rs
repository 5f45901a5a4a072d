//! Buffer pool errors.

use thiserror::Error;
use tundra_common::PageId;

use crate::file::FileError;

/// Result type for buffer pool operations.
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer pool operations.
#[derive(Debug, Error)]
#[allow(missing_docs)] // Fields are documented by variant docs
pub enum BufferError {
    /// Every frame is pinned; no victim can be selected.
    #[error("pool exhausted: all {capacity} frames are pinned")]
    PoolExhausted { capacity: usize },

    /// Invalid page ID (the NO_PAGE sentinel).
    #[error("invalid page ID: {page_id:?}")]
    InvalidPageId { page_id: PageId },

    /// The handle's page is not resident in the pool.
    #[error("page {page_id} is not resident in the pool")]
    PageNotResident { page_id: PageId },

    /// Shutdown attempted while frames are still pinned.
    #[error("cannot close pool: {pinned} frame(s) still pinned")]
    PinnedOnShutdown { pinned: usize },

    /// The pool has been closed.
    #[error("buffer pool is closed")]
    Closed,

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Page file error.
    #[error("page file error: {0}")]
    File(#[from] FileError),
}

impl BufferError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true if this is a transient error that can be retried.
    ///
    /// An exhausted pool recovers as soon as a caller unpins a frame.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PoolExhausted { .. })
    }
}
