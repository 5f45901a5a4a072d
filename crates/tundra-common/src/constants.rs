//! System-wide constants for TundraDB.
//!
//! This module defines constants used across the database.

// =============================================================================
// Page Constants
// =============================================================================

/// Default page size in bytes (4 KB).
///
/// This matches the common filesystem block size, so a page maps onto a
/// whole number of disk blocks.
pub const DEFAULT_PAGE_SIZE: usize = 4 * 1024;

/// Minimum page size in bytes (512 B).
pub const MIN_PAGE_SIZE: usize = 512;

/// Maximum page size in bytes (64 KB).
pub const MAX_PAGE_SIZE: usize = 64 * 1024;

// =============================================================================
// Buffer Pool Constants
// =============================================================================

/// Default number of frames in a buffer pool.
pub const DEFAULT_POOL_FRAMES: usize = 1024;

/// Minimum number of frames in a buffer pool.
///
/// A single frame is enough to run the pin protocol, albeit with an
/// eviction on every miss.
pub const MIN_POOL_FRAMES: usize = 1;

/// Minimum buffer pool memory size (64 KB).
pub const MIN_BUFFER_POOL_SIZE: usize = 64 * 1024;

/// Bound on CLOCK hand advances per victim search, as a multiple of the
/// pool capacity.
///
/// One sweep may only clear reference bits; a second sweep then finds a
/// victim or proves that every frame is pinned.
pub const CLOCK_SWEEP_FACTOR: usize = 2;
