//! Page handles returned by pin.

use tundra_common::PageId;

use super::frame::FrameId;

/// A handle to a pinned page.
///
/// A handle is returned by [`BufferPool::pin`](super::BufferPool::pin) and
/// stays valid until passed back to
/// [`BufferPool::unpin`](super::BufferPool::unpin), which consumes it - a
/// handle cannot be used after its pin is released. While the handle is
/// live, the frame it names cannot be evicted, so the page bytes reached
/// through [`BufferPool::data`](super::BufferPool::data) and
/// [`BufferPool::data_mut`](super::BufferPool::data_mut) are stable.
pub struct PageHandle {
    /// The pinned page.
    page_id: PageId,
    /// The frame holding it.
    frame_id: FrameId,
}

impl PageHandle {
    /// Creates a new handle for a pinned page.
    pub(crate) fn new(page_id: PageId, frame_id: FrameId) -> Self {
        Self { page_id, frame_id }
    }

    /// Returns the page ID.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Returns the frame holding the page.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }
}

impl std::fmt::Debug for PageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageHandle")
            .field("page_id", &self.page_id)
            .field("frame_id", &self.frame_id)
            .finish()
    }
}
