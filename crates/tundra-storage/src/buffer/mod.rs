//! Buffer pool manager for TundraDB.
//!
//! The buffer pool caches a fixed number of disk pages in memory and
//! mediates all page-level I/O between higher layers and the page file:
//!
//! - **Pin/Unpin**: reference counting that gates eviction
//! - **Dirty tracking**: modified pages are written back before their
//!   frame is reused
//! - **Replacement policies**: FIFO, LRU, and CLOCK victim selection
//! - **Statistics**: read/write I/O counters and per-frame snapshots
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                     BufferPool                       │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │       Page Table: HashMap<PageId, FrameId>     │  │
//! │  └────────────────────────────────────────────────┘  │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │ Frame Array                                    │  │
//! │  │  ┌────────┐ ┌────────┐       ┌────────┐        │  │
//! │  │  │page_id │ │page_id │  ...  │page_id │        │  │
//! │  │  │data[]  │ │data[]  │       │data[]  │        │  │
//! │  │  │dirty   │ │dirty   │       │dirty   │        │  │
//! │  │  │fix_cnt │ │fix_cnt │       │fix_cnt │        │  │
//! │  │  └────────┘ └────────┘       └────────┘        │  │
//! │  └────────────────────────────────────────────────┘  │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │ Replacer (FIFO queue / LRU list / CLOCK hand)  │  │
//! │  └────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use tundra_common::PageId;
//! use tundra_storage::buffer::{BufferPool, BufferPoolConfig, ReplacementPolicy};
//!
//! fn example() -> tundra_storage::buffer::BufferResult<()> {
//!     let config = BufferPoolConfig::new(128).with_policy(ReplacementPolicy::Lru);
//!     let mut pool = BufferPool::open("data.db", config)?;
//!
//!     let handle = pool.pin(PageId::new(42))?;
//!     pool.data_mut(&handle)?[0] = 1;
//!     pool.unpin(handle)?;
//!
//!     pool.flush_all()?;
//!     pool.close()?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod eviction;
mod frame;
mod handle;
mod pool;

pub use config::BufferPoolConfig;
pub use error::{BufferError, BufferResult};
pub use eviction::ReplacementPolicy;
pub use frame::FrameId;
pub use handle::PageHandle;
pub use pool::BufferPool;

/// Statistics for buffer pool monitoring.
#[derive(Debug, Clone, Default)]
pub struct BufferPoolStats {
    /// Number of pages read from disk.
    pub reads: u64,
    /// Number of dirty pages written to disk.
    pub writes: u64,
    /// Number of pins satisfied from memory.
    pub hits: u64,
    /// Number of pins that required a disk read.
    pub misses: u64,
    /// Number of pages evicted to make room.
    pub evictions: u64,
    /// Number of explicit flushes (force-page and force-flush writes).
    pub flushes: u64,
    /// Current number of pinned frames.
    pub pinned_frames: usize,
    /// Current number of dirty frames.
    pub dirty_frames: usize,
}

impl BufferPoolStats {
    /// Returns the cache hit ratio (0.0 to 1.0).
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
