//! Buffer frame - a slot in the buffer pool that holds one page.

use tundra_common::PageId;

/// Frame identifier - index into the buffer pool's frame array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub usize);

impl FrameId {
    /// Invalid frame ID.
    pub const INVALID: Self = Self(usize::MAX);

    /// Creates a new frame ID.
    #[inline]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the raw index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Checks if this is a valid frame ID.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != usize::MAX
    }
}

impl From<usize> for FrameId {
    fn from(id: usize) -> Self {
        Self::new(id)
    }
}

impl From<FrameId> for usize {
    fn from(id: FrameId) -> Self {
        id.0
    }
}

/// A buffer frame holds a single page in memory.
///
/// Each frame has a data buffer for the page contents plus the metadata
/// the pin protocol and the replacement policies act on: the resident
/// page id (or [`PageId::NO_PAGE`] when empty), the dirty flag, the fix
/// count, and the CLOCK reference bit. The pool is single-threaded, so
/// all state is plain fields mutated through `&mut self`.
pub(crate) struct Frame {
    /// Frame ID (index in the frame array).
    frame_id: FrameId,
    /// Page data buffer, exactly one page long.
    data: Vec<u8>,
    /// Page ID stored in this frame (NO_PAGE if empty).
    page_id: PageId,
    /// Fix count (number of outstanding pins).
    fix_count: u32,
    /// Whether the page was modified since last read or write-back.
    dirty: bool,
    /// Reference bit for CLOCK eviction.
    referenced: bool,
}

impl Frame {
    /// Creates a new empty buffer frame.
    pub(crate) fn new(frame_id: FrameId, page_size: usize) -> Self {
        Self {
            frame_id,
            data: vec![0u8; page_size],
            page_id: PageId::NO_PAGE,
            fix_count: 0,
            dirty: false,
            referenced: false,
        }
    }

    /// Returns the frame ID.
    #[inline]
    pub(crate) fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Returns the page ID stored in this frame.
    #[inline]
    pub(crate) fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Sets the page ID for this frame.
    #[inline]
    pub(crate) fn set_page_id(&mut self, page_id: PageId) {
        self.page_id = page_id;
    }

    /// Returns true if this frame is empty (no page assigned).
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        !self.page_id.is_valid()
    }

    /// Returns the current fix count.
    #[inline]
    pub(crate) fn fix_count(&self) -> u32 {
        self.fix_count
    }

    /// Increments the fix count and returns the new value.
    ///
    /// Also sets the reference bit, since a pin is an access.
    #[inline]
    pub(crate) fn pin(&mut self) -> u32 {
        self.fix_count += 1;
        self.referenced = true;
        self.fix_count
    }

    /// Decrements the fix count and returns the new value.
    ///
    /// Unpinning an unpinned frame is a caller bug; debug builds assert.
    #[inline]
    pub(crate) fn unpin(&mut self) -> u32 {
        debug_assert!(self.fix_count > 0, "unpinned frame with fix_count = 0");
        self.fix_count = self.fix_count.saturating_sub(1);
        self.fix_count
    }

    /// Returns true if the frame is pinned.
    #[inline]
    pub(crate) fn is_pinned(&self) -> bool {
        self.fix_count > 0
    }

    /// Returns true if the frame is dirty.
    #[inline]
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Sets or clears the dirty flag.
    #[inline]
    pub(crate) fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Returns the reference bit (for the CLOCK algorithm).
    #[inline]
    pub(crate) fn is_referenced(&self) -> bool {
        self.referenced
    }

    /// Clears the reference bit.
    #[inline]
    pub(crate) fn clear_referenced(&mut self) {
        self.referenced = false;
    }

    /// Returns the page data.
    #[inline]
    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the page data mutably.
    ///
    /// Dirty tracking is the caller's responsibility; the pool's read-in
    /// path fills the buffer without dirtying the frame.
    #[inline]
    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Resets the frame to empty state.
    ///
    /// The data buffer is left as-is; the next read-in overwrites it.
    pub(crate) fn reset(&mut self) {
        self.page_id = PageId::NO_PAGE;
        self.fix_count = 0;
        self.dirty = false;
        self.referenced = false;
    }

    /// Returns true if this frame can be evicted: it holds a page and
    /// nobody has it pinned.
    #[inline]
    pub(crate) fn is_evictable(&self) -> bool {
        !self.is_pinned() && !self.is_empty()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("frame_id", &self.frame_id)
            .field("page_id", &self.page_id)
            .field("fix_count", &self.fix_count)
            .field("dirty", &self.dirty)
            .field("referenced", &self.referenced)
            .finish()
    }
}
