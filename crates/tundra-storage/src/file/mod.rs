//! Page-file I/O layer for TundraDB.
//!
//! This module provides blocking, page-granular access to a single data
//! file. A page file is a flat sequence of fixed-size blocks addressed by
//! zero-based [`PageId`](tundra_common::PageId); the file length is always
//! a whole number of pages.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tundra_common::PageId;
//! use tundra_storage::file::PageFile;
//!
//! fn example() -> tundra_storage::file::FileResult<()> {
//!     let mut file = PageFile::create("data.db", 4096)?;
//!
//!     let mut buf = vec![0u8; 4096];
//!     file.read_block(PageId::new(0), &mut buf)?;
//!
//!     buf[..5].copy_from_slice(b"hello");
//!     file.write_block(PageId::new(0), &buf)?;
//!     file.sync()?;
//!
//!     Ok(())
//! }
//! ```

mod error;
mod options;
mod page_file;

pub use error::{FileError, FileResult};
pub use options::OpenOptions;
pub use page_file::PageFile;
