//! Page replacement policies.
//!
//! All three policies share one contract: `on_hit` and `on_admit` keep the
//! ordering metadata in step with pin events, and `select_victim` picks an
//! unpinned resident frame or reports that none exists.
//!
//! `select_victim` never reorders queue or list state, so a pin that fails
//! after victim selection (a rejected write-back, say) leaves the policy
//! consistent; the bookkeeping for a completed replacement happens in
//! `on_admit`.

use std::collections::VecDeque;
use std::fmt;

use tundra_common::CLOCK_SWEEP_FACTOR;

use super::frame::{Frame, FrameId};

/// Page replacement policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplacementPolicy {
    /// Evict the oldest arrival first; hits do not reorder.
    Fifo,
    /// Evict the least recently used page; every pin refreshes recency.
    #[default]
    Lru,
    /// Second-chance approximation of LRU using a hand and reference bits.
    Clock,
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fifo => write!(f, "fifo"),
            Self::Lru => write!(f, "lru"),
            Self::Clock => write!(f, "clock"),
        }
    }
}

/// Replacement state for a pool, dispatched once per pin.
pub(crate) enum Replacer {
    Fifo(FifoReplacer),
    Lru(LruReplacer),
    Clock(ClockReplacer),
}

impl Replacer {
    /// Creates the replacement state for the given policy and capacity.
    pub(crate) fn new(policy: ReplacementPolicy, capacity: usize) -> Self {
        match policy {
            ReplacementPolicy::Fifo => Self::Fifo(FifoReplacer::new(capacity)),
            ReplacementPolicy::Lru => Self::Lru(LruReplacer::new(capacity)),
            ReplacementPolicy::Clock => Self::Clock(ClockReplacer::new(capacity)),
        }
    }

    /// Records a pin that found its page resident.
    pub(crate) fn on_hit(&mut self, frame_id: FrameId) {
        match self {
            Self::Fifo(_) => {} // Hits do not reorder a FIFO queue
            Self::Lru(lru) => lru.touch(frame_id),
            Self::Clock(_) => {} // The pin itself set the reference bit
        }
    }

    /// Records a page admitted into a frame, whether into a free slot or
    /// over an evicted victim.
    pub(crate) fn on_admit(&mut self, frame_id: FrameId) {
        match self {
            Self::Fifo(fifo) => fifo.enqueue(frame_id),
            Self::Lru(lru) => lru.touch(frame_id),
            Self::Clock(clock) => clock.pass_hand(frame_id),
        }
    }

    /// Selects a victim frame with fix count zero, or `None` if every
    /// candidate is pinned.
    pub(crate) fn select_victim(&mut self, frames: &mut [Frame]) -> Option<FrameId> {
        match self {
            Self::Fifo(fifo) => fifo.select(frames),
            Self::Lru(lru) => lru.select(frames),
            Self::Clock(clock) => clock.select(frames),
        }
    }
}

/// FIFO replacement: an arrival-order queue of frame indices.
pub(crate) struct FifoReplacer {
    /// Frames in arrival order, oldest at the front.
    queue: VecDeque<FrameId>,
}

impl FifoReplacer {
    fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
        }
    }

    /// Moves the frame to the back of the queue as the newest arrival.
    fn enqueue(&mut self, frame_id: FrameId) {
        self.queue.retain(|&id| id != frame_id);
        self.queue.push_back(frame_id);
    }

    /// Scans from the oldest arrival, skipping pinned frames.
    fn select(&self, frames: &[Frame]) -> Option<FrameId> {
        self.queue
            .iter()
            .copied()
            .find(|id| frames[id.index()].is_evictable())
    }
}

/// LRU replacement: a recency-ordered list of frame indices.
///
/// The list plays the role a doubly-linked node chain plays in a
/// pointer-based LRU; with pool-sized capacities the linear splice is not
/// worth avoiding.
pub(crate) struct LruReplacer {
    /// Frames in recency order, most recently used at the front.
    order: VecDeque<FrameId>,
}

impl LruReplacer {
    fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
        }
    }

    /// Moves the frame to the front as the most recently used.
    fn touch(&mut self, frame_id: FrameId) {
        self.order.retain(|&id| id != frame_id);
        self.order.push_front(frame_id);
    }

    /// Scans from the least recently used end, skipping pinned frames.
    fn select(&self, frames: &[Frame]) -> Option<FrameId> {
        self.order
            .iter()
            .rev()
            .copied()
            .find(|id| frames[id.index()].is_evictable())
    }
}

/// CLOCK replacement: a hand sweeping the frame array, giving referenced
/// frames a second chance.
pub(crate) struct ClockReplacer {
    /// Current position of the clock hand.
    hand: usize,
    /// Number of frames in the pool.
    capacity: usize,
}

impl ClockReplacer {
    fn new(capacity: usize) -> Self {
        Self { hand: 0, capacity }
    }

    /// Moves the hand past a freshly admitted frame.
    fn pass_hand(&mut self, frame_id: FrameId) {
        self.hand = (frame_id.index() + 1) % self.capacity;
    }

    /// Sweeps the frames starting at the hand:
    ///
    /// - pinned or empty: advance
    /// - reference bit set: clear it and advance (second chance)
    /// - otherwise: select as victim, leaving the hand in place
    ///
    /// At most `CLOCK_SWEEP_FACTOR * capacity` advances suffice to find a
    /// victim or prove every frame is pinned.
    fn select(&mut self, frames: &mut [Frame]) -> Option<FrameId> {
        for _ in 0..CLOCK_SWEEP_FACTOR * self.capacity {
            let frame = &mut frames[self.hand];

            if frame.is_pinned() || frame.is_empty() {
                self.advance();
                continue;
            }

            if frame.is_referenced() {
                frame.clear_referenced();
                self.advance();
                continue;
            }

            return Some(frame.frame_id());
        }

        None
    }

    #[inline]
    fn advance(&mut self) {
        self.hand = (self.hand + 1) % self.capacity;
    }

    /// Returns the current hand position.
    #[cfg(test)]
    fn hand_position(&self) -> usize {
        self.hand
    }
}
