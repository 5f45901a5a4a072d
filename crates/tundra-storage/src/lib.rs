//! # tundra-storage
//!
//! Page-file storage and buffer management for TundraDB.
//!
//! This crate implements the disk-facing half of TundraDB:
//!
//! - [`file`]: a page-granular file layer with bounds-checked block I/O
//!   and zero-filled file extension
//! - [`buffer`]: a fixed-size buffer pool that caches pages in memory with
//!   pin/unpin reference counting, dirty-page write-back, and pluggable
//!   page replacement (FIFO, LRU, CLOCK)

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Buffer pool manager
pub mod buffer;

/// Page file management and I/O
pub mod file;
