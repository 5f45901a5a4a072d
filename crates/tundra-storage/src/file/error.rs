//! Error types for the page-file layer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tundra_common::PageId;

/// Result type for page-file operations.
pub type FileResult<T> = Result<T, FileError>;

/// Errors that can occur during page-file operations.
#[derive(Debug, Error)]
#[allow(missing_docs)] // Fields are documented by variant docs
pub enum FileError {
    /// Standard I/O error.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Page file not found.
    #[error("page file not found: {path}")]
    NotFound { path: PathBuf },

    /// Permission denied.
    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Page file already exists.
    #[error("page file already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// Read or write addressed a page beyond the file extent.
    #[error("page {page_id} does not exist, file has {page_count} page(s)")]
    NonExistentPage { page_id: PageId, page_count: u64 },

    /// Buffer length does not match the page size.
    #[error("buffer length mismatch: page size is {expected} bytes, buffer has {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Block write rejected by the operating system.
    #[error("write of page {page_id} failed: {source}")]
    WriteFailed { page_id: PageId, source: io::Error },

    /// Invalid operation for the file mode.
    #[error("invalid operation: {operation} not allowed in {mode} mode")]
    InvalidOperation {
        operation: &'static str,
        mode: &'static str,
    },
}

impl FileError {
    /// Creates a new NotFound error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates a NonExistentPage error.
    pub fn non_existent_page(page_id: PageId, page_count: u64) -> Self {
        Self::NonExistentPage {
            page_id,
            page_count,
        }
    }

    /// Returns true if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
            || matches!(self, Self::Io { source } if source.kind() == io::ErrorKind::NotFound)
    }

    /// Returns true if this is a permission error.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
            || matches!(self, Self::Io { source } if source.kind() == io::ErrorKind::PermissionDenied)
    }

    /// Converts from `std::io::Error` with path context.
    pub fn from_io_with_path(err: io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::AlreadyExists => Self::AlreadyExists { path },
            _ => Self::Io { source: err },
        }
    }
}
