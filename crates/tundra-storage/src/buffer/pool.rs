//! Buffer pool implementation.
//!
//! The buffer pool manages a fixed-size cache of pages in memory,
//! handling page fetching, eviction, and write-back. A single pool is
//! single-threaded: the caller serializes operations, and every operation
//! runs to completion, blocking only inside page-file I/O.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, trace};
use tundra_common::PageId;

use super::config::BufferPoolConfig;
use super::error::{BufferError, BufferResult};
use super::eviction::{Replacer, ReplacementPolicy};
use super::frame::{Frame, FrameId};
use super::handle::PageHandle;
use super::BufferPoolStats;
use crate::file::PageFile;

/// The buffer pool caches pages of one page file in a fixed number of
/// in-memory frames.
///
/// Pages are pinned with [`pin`](Self::pin), which returns a
/// [`PageHandle`]; while a page has outstanding pins its frame is never
/// reused. On a miss with no free frame, the configured replacement
/// policy selects an unpinned victim, whose bytes are written back first
/// if dirty.
pub struct BufferPool {
    /// Configuration.
    config: BufferPoolConfig,
    /// Array of buffer frames, in stable slot order.
    frames: Vec<Frame>,
    /// Page table: maps resident page to its frame.
    page_table: HashMap<PageId, FrameId>,
    /// Replacement policy state.
    replacer: Replacer,
    /// The backing page file, held open for the pool's lifetime.
    file: PageFile,
    /// Number of pages read from disk.
    reads: u64,
    /// Number of dirty pages written to disk.
    writes: u64,
    /// Pin hits.
    hits: u64,
    /// Pin misses.
    misses: u64,
    /// Pages evicted.
    evictions: u64,
    /// Explicit flush writes.
    flushes: u64,
    /// Whether the pool has been closed.
    closed: bool,
}

impl BufferPool {
    /// Opens a buffer pool over an existing page file.
    ///
    /// The file must already exist (create it with
    /// [`PageFile::create`]); a missing file surfaces as a file error.
    pub fn open(path: impl AsRef<Path>, config: BufferPoolConfig) -> BufferResult<Self> {
        config.validate().map_err(BufferError::config)?;

        let path = path.as_ref();
        let file = PageFile::open(path, config.page_size)?;

        let frames = (0..config.capacity)
            .map(|i| Frame::new(FrameId::new(i), config.page_size))
            .collect();

        info!(
            path = %path.display(),
            capacity = config.capacity,
            policy = %config.policy,
            "buffer pool opened"
        );

        Ok(Self {
            replacer: Replacer::new(config.policy, config.capacity),
            frames,
            page_table: HashMap::with_capacity(config.capacity),
            file,
            reads: 0,
            writes: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
            flushes: 0,
            closed: false,
            config,
        })
    }

    /// Pins a page, reading it from disk if it is not resident.
    ///
    /// On a hit no I/O occurs. On a miss the page is read into a free
    /// frame, or into an evicted victim's frame once the victim (if
    /// dirty) has been written back. Fails with
    /// [`BufferError::PoolExhausted`] when every frame is pinned.
    pub fn pin(&mut self, page_id: PageId) -> BufferResult<PageHandle> {
        self.check_open()?;

        if !page_id.is_valid() {
            return Err(BufferError::InvalidPageId { page_id });
        }

        // Hit path: bump the fix count and the policy metadata
        if let Some(&frame_id) = self.page_table.get(&page_id) {
            self.hits += 1;
            self.frames[frame_id.index()].pin();
            self.replacer.on_hit(frame_id);
            trace!(%page_id, frame = frame_id.index(), "pin hit");
            return Ok(PageHandle::new(page_id, frame_id));
        }

        // Miss path: take a free frame, or make one by eviction
        self.misses += 1;
        let frame_id = match self.free_frame() {
            Some(frame_id) => frame_id,
            None => self.evict_frame()?,
        };

        self.load_frame(frame_id, page_id)?;
        self.replacer.on_admit(frame_id);
        trace!(%page_id, frame = frame_id.index(), "pin miss");
        Ok(PageHandle::new(page_id, frame_id))
    }

    /// Releases one pin on the handle's page, consuming the handle.
    ///
    /// Unpinning a page that is no longer resident succeeds silently.
    pub fn unpin(&mut self, handle: PageHandle) -> BufferResult<()> {
        self.check_open()?;
        if let Some(&frame_id) = self.page_table.get(&handle.page_id()) {
            self.frames[frame_id.index()].unpin();
        }
        Ok(())
    }

    /// Marks the handle's page as modified.
    ///
    /// Idempotent; marking a page that is no longer resident succeeds
    /// silently.
    pub fn mark_dirty(&mut self, handle: &PageHandle) -> BufferResult<()> {
        self.check_open()?;
        if let Some(&frame_id) = self.page_table.get(&handle.page_id()) {
            self.frames[frame_id.index()].set_dirty(true);
        }
        Ok(())
    }

    /// Writes the handle's page to disk now if it is dirty.
    ///
    /// Forcing a page that is clean or no longer resident succeeds
    /// silently.
    pub fn force_page(&mut self, handle: &PageHandle) -> BufferResult<()> {
        self.check_open()?;
        if let Some(&frame_id) = self.page_table.get(&handle.page_id()) {
            if self.frames[frame_id.index()].is_dirty() {
                self.write_back(frame_id)?;
                self.flushes += 1;
            }
        }
        Ok(())
    }

    /// Writes every dirty, unpinned page to disk.
    ///
    /// Pinned dirty frames are skipped. Returns the number of pages
    /// written; calling it again immediately writes nothing.
    pub fn flush_all(&mut self) -> BufferResult<usize> {
        self.check_open()?;

        let mut flushed = 0;
        for i in 0..self.frames.len() {
            let frame = &self.frames[i];
            if frame.is_dirty() && !frame.is_pinned() && !frame.is_empty() {
                self.write_back(FrameId::new(i))?;
                flushed += 1;
            }
        }

        self.flushes += flushed as u64;
        Ok(flushed)
    }

    /// Flushes all dirty unpinned pages and shuts the pool down.
    ///
    /// Refuses with [`BufferError::PinnedOnShutdown`] if any frame still
    /// has outstanding pins, leaving the pool fully usable. After a
    /// successful close every further mutating operation fails with
    /// [`BufferError::Closed`]; the statistics snapshots stay readable
    /// and keep reporting one entry per frame. Closing twice is a no-op.
    pub fn close(&mut self) -> BufferResult<()> {
        if self.closed {
            return Ok(());
        }

        let pinned = self.frames.iter().filter(|f| f.is_pinned()).count();
        if pinned > 0 {
            return Err(BufferError::PinnedOnShutdown { pinned });
        }

        self.flush_all()?;
        self.file.sync()?;
        self.closed = true;

        info!(path = %self.file.path().display(), "buffer pool closed");
        Ok(())
    }

    /// Returns the bytes of a pinned page.
    pub fn data(&self, handle: &PageHandle) -> BufferResult<&[u8]> {
        let frame_id = self.resident_frame(handle)?;
        Ok(self.frames[frame_id.index()].data())
    }

    /// Returns the bytes of a pinned page mutably, marking it dirty.
    pub fn data_mut(&mut self, handle: &PageHandle) -> BufferResult<&mut [u8]> {
        let frame_id = self.resident_frame(handle)?;
        let frame = &mut self.frames[frame_id.index()];
        frame.set_dirty(true);
        Ok(frame.data_mut())
    }

    // -------------------------------------------------------------------------
    // Statistics and introspection
    // -------------------------------------------------------------------------

    /// Returns the resident page of each frame in slot order, with
    /// [`PageId::NO_PAGE`] for empty frames.
    pub fn frame_contents(&self) -> Vec<PageId> {
        self.frames.iter().map(Frame::page_id).collect()
    }

    /// Returns the dirty flag of each frame in slot order.
    pub fn dirty_flags(&self) -> Vec<bool> {
        self.frames.iter().map(Frame::is_dirty).collect()
    }

    /// Returns the fix count of each frame in slot order.
    pub fn fix_counts(&self) -> Vec<u32> {
        self.frames.iter().map(Frame::fix_count).collect()
    }

    /// Returns the number of pages read from disk so far.
    pub fn read_count(&self) -> u64 {
        self.reads
    }

    /// Returns the number of pages written to disk so far.
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Returns the number of frames holding a page.
    pub fn occupied(&self) -> usize {
        self.page_table.len()
    }

    /// Returns true if the page is resident.
    pub fn contains(&self, page_id: PageId) -> bool {
        self.page_table.contains_key(&page_id)
    }

    /// Returns the number of frames in the pool.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Returns the page size in bytes.
    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// Returns the replacement policy the pool runs.
    pub fn policy(&self) -> ReplacementPolicy {
        self.config.policy
    }

    /// Returns a snapshot of the pool's statistics.
    pub fn stats(&self) -> BufferPoolStats {
        BufferPoolStats {
            reads: self.reads,
            writes: self.writes,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            flushes: self.flushes,
            pinned_frames: self.frames.iter().filter(|f| f.is_pinned()).count(),
            dirty_frames: self.frames.iter().filter(|f| f.is_dirty()).count(),
        }
    }

    // -------------------------------------------------------------------------
    // Private helpers
    // -------------------------------------------------------------------------

    /// Fails if the pool has been closed.
    fn check_open(&self) -> BufferResult<()> {
        if self.closed {
            Err(BufferError::Closed)
        } else {
            Ok(())
        }
    }

    /// Resolves a handle to its frame, or reports the page gone.
    fn resident_frame(&self, handle: &PageHandle) -> BufferResult<FrameId> {
        self.page_table
            .get(&handle.page_id())
            .copied()
            .ok_or(BufferError::PageNotResident {
                page_id: handle.page_id(),
            })
    }

    /// Finds the lowest-index empty frame.
    fn free_frame(&self) -> Option<FrameId> {
        self.frames.iter().find(|f| f.is_empty()).map(Frame::frame_id)
    }

    /// Selects a victim, writes it back if dirty, and empties its frame.
    ///
    /// A failed write-back aborts the eviction with the victim still
    /// resident and still dirty, so a later pin can retry it.
    fn evict_frame(&mut self) -> BufferResult<FrameId> {
        let victim = self
            .replacer
            .select_victim(&mut self.frames)
            .ok_or(BufferError::PoolExhausted {
                capacity: self.config.capacity,
            })?;

        let old_page = self.frames[victim.index()].page_id();
        if self.frames[victim.index()].is_dirty() {
            self.write_back(victim)?;
        }

        self.frames[victim.index()].reset();
        self.page_table.remove(&old_page);
        self.evictions += 1;
        debug!(page_id = %old_page, frame = victim.index(), "evicted page");
        Ok(victim)
    }

    /// Reads `page_id` from disk into the (empty) frame and pins it.
    ///
    /// The file is extended with zero pages first if the page does not
    /// exist yet. A failed read leaves the frame empty.
    fn load_frame(&mut self, frame_id: FrameId, page_id: PageId) -> BufferResult<()> {
        self.file.ensure_capacity(page_id.next().as_u64())?;

        let frame = &mut self.frames[frame_id.index()];
        if let Err(err) = self.file.read_block(page_id, frame.data_mut()) {
            frame.reset();
            return Err(err.into());
        }

        frame.set_page_id(page_id);
        frame.set_dirty(false);
        frame.pin();
        self.page_table.insert(page_id, frame_id);
        self.reads += 1;
        Ok(())
    }

    /// Writes the frame's page to disk and clears its dirty flag.
    fn write_back(&mut self, frame_id: FrameId) -> BufferResult<()> {
        let page_id = self.frames[frame_id.index()].page_id();

        self.file.ensure_capacity(page_id.next().as_u64())?;
        self.file
            .write_block(page_id, self.frames[frame_id.index()].data())?;

        self.frames[frame_id.index()].set_dirty(false);
        self.writes += 1;
        debug!(%page_id, "wrote back dirty page");
        Ok(())
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("capacity", &self.config.capacity)
            .field("page_size", &self.config.page_size)
            .field("policy", &self.config.policy)
            .field("occupied", &self.page_table.len())
            .field("stats", &self.stats())
            .finish()
    }
}
