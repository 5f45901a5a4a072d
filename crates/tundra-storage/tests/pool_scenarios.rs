//! End-to-end buffer pool scenarios.
//!
//! These tests drive the pool over a real page file in a temp directory
//! and check eviction order, write-back, and the statistics counters for
//! each replacement policy.

use tempfile::{tempdir, TempDir};
use tundra_common::PageId;
use tundra_storage::buffer::{
    BufferError, BufferPool, BufferPoolConfig, PageHandle, ReplacementPolicy,
};
use tundra_storage::file::PageFile;

const PAGE_SIZE: usize = 512;

/// Creates a page file with `pages` pages, each stamped with "P<id>" at
/// the start of its block.
fn create_stamped_file(dir: &TempDir, pages: u64) -> std::path::PathBuf {
    let path = dir.path().join("scenario.db");
    let mut file = PageFile::create(&path, PAGE_SIZE).unwrap();
    file.ensure_capacity(pages).unwrap();

    for i in 0..pages {
        let mut buf = vec![0u8; PAGE_SIZE];
        let tag = format!("P{i}");
        buf[..tag.len()].copy_from_slice(tag.as_bytes());
        file.write_block(PageId::new(i), &buf).unwrap();
    }
    file.sync().unwrap();
    path
}

fn open_pool(path: &std::path::Path, capacity: usize, policy: ReplacementPolicy) -> BufferPool {
    let config = BufferPoolConfig::new(capacity)
        .with_page_size(PAGE_SIZE)
        .with_policy(policy);
    BufferPool::open(path, config).unwrap()
}

fn page_ids(ids: &[u64]) -> Vec<PageId> {
    ids.iter().copied().map(PageId::new).collect()
}

fn pin(pool: &mut BufferPool, id: u64) -> PageHandle {
    pool.pin(PageId::new(id)).unwrap()
}

#[test]
fn fifo_evicts_in_arrival_order() {
    let dir = tempdir().unwrap();
    let path = create_stamped_file(&dir, 8);
    let mut pool = open_pool(&path, 3, ReplacementPolicy::Fifo);

    let h1 = pin(&mut pool, 1);
    let h2 = pin(&mut pool, 2);
    let h3 = pin(&mut pool, 3);
    pool.unpin(h1).unwrap();
    pool.unpin(h2).unwrap();
    pool.unpin(h3).unwrap();

    // Page 1 is the oldest arrival; page 4 takes its slot
    let h4 = pin(&mut pool, 4);

    assert_eq!(pool.frame_contents(), page_ids(&[4, 2, 3]));
    assert_eq!(pool.read_count(), 4);
    assert_eq!(pool.write_count(), 0);
    pool.unpin(h4).unwrap();
}

#[test]
fn lru_preserves_recently_used_page() {
    let dir = tempdir().unwrap();
    let path = create_stamped_file(&dir, 8);
    let mut pool = open_pool(&path, 3, ReplacementPolicy::Lru);

    let h1 = pin(&mut pool, 1);
    let h2 = pin(&mut pool, 2);
    let h3 = pin(&mut pool, 3);
    pool.unpin(h1).unwrap();
    pool.unpin(h2).unwrap();
    pool.unpin(h3).unwrap();

    // Re-pinning page 1 refreshes its recency, so page 2 is now the
    // least recently used and loses its slot to page 4.
    let h1 = pin(&mut pool, 1);
    let h4 = pin(&mut pool, 4);

    assert_eq!(pool.frame_contents(), page_ids(&[1, 4, 3]));
    assert_eq!(pool.read_count(), 4);
    assert_eq!(pool.write_count(), 0);
    pool.unpin(h1).unwrap();
    pool.unpin(h4).unwrap();
}

#[test]
fn clock_gives_second_chances() {
    let dir = tempdir().unwrap();
    let path = create_stamped_file(&dir, 8);
    let mut pool = open_pool(&path, 3, ReplacementPolicy::Clock);

    let h1 = pin(&mut pool, 1);
    let h2 = pin(&mut pool, 2);
    let h3 = pin(&mut pool, 3);
    pool.unpin(h1).unwrap();
    pool.unpin(h2).unwrap();
    pool.unpin(h3).unwrap();

    // The hand sits on page 1's slot. With page 1 pinned again, the
    // sweep skips it, spends page 2's reference bit, wraps, and settles
    // on page 2 as the victim.
    let h1 = pin(&mut pool, 1);
    let h4 = pin(&mut pool, 4);

    assert_eq!(pool.frame_contents(), page_ids(&[1, 4, 3]));
    assert_eq!(pool.read_count(), 4);
    assert_eq!(pool.write_count(), 0);
    pool.unpin(h1).unwrap();
    pool.unpin(h4).unwrap();
}

#[test]
fn dirty_page_written_back_on_eviction() {
    let dir = tempdir().unwrap();
    let path = create_stamped_file(&dir, 4);
    let mut pool = open_pool(&path, 1, ReplacementPolicy::Fifo);

    let h0 = pin(&mut pool, 0);
    pool.data_mut(&h0).unwrap()[..7].copy_from_slice(b"updated");
    pool.mark_dirty(&h0).unwrap();
    pool.unpin(h0).unwrap();

    // Pinning page 1 evicts dirty page 0: exactly one write, two reads
    let h1 = pin(&mut pool, 1);
    assert_eq!(pool.write_count(), 1);
    assert_eq!(pool.read_count(), 2);
    assert_eq!(pool.frame_contents(), page_ids(&[1]));
    pool.unpin(h1).unwrap();

    // The written bytes reached the file
    let mut file = PageFile::open(&path, PAGE_SIZE).unwrap();
    let mut buf = vec![0u8; PAGE_SIZE];
    file.read_block(PageId::new(0), &mut buf).unwrap();
    assert_eq!(&buf[..7], b"updated");
}

#[test]
fn pinned_frames_are_never_evicted() {
    let dir = tempdir().unwrap();
    let path = create_stamped_file(&dir, 4);

    for policy in [
        ReplacementPolicy::Fifo,
        ReplacementPolicy::Lru,
        ReplacementPolicy::Clock,
    ] {
        let mut pool = open_pool(&path, 2, policy);

        let h0 = pin(&mut pool, 0);
        let h1 = pin(&mut pool, 1);

        let err = pool.pin(PageId::new(2)).unwrap_err();
        assert!(matches!(err, BufferError::PoolExhausted { capacity: 2 }));
        assert!(err.is_retryable());

        // The failed pin left the pool untouched
        assert_eq!(pool.frame_contents(), page_ids(&[0, 1]));
        assert_eq!(pool.fix_counts(), vec![1, 1]);
        assert_eq!(pool.read_count(), 2);
        assert_eq!(pool.write_count(), 0);

        pool.unpin(h0).unwrap();
        pool.unpin(h1).unwrap();
    }
}

#[test]
fn force_flush_writes_only_dirty_unpinned() {
    let dir = tempdir().unwrap();
    let path = create_stamped_file(&dir, 4);
    let mut pool = open_pool(&path, 3, ReplacementPolicy::Fifo);

    let h0 = pin(&mut pool, 0);
    let h1 = pin(&mut pool, 1);
    let h2 = pin(&mut pool, 2);
    pool.mark_dirty(&h0).unwrap();
    pool.mark_dirty(&h1).unwrap();
    pool.mark_dirty(&h2).unwrap();
    pool.unpin(h0).unwrap();
    pool.unpin(h1).unwrap();

    // Page 2 is still pinned and must be skipped
    let flushed = pool.flush_all().unwrap();
    assert_eq!(flushed, 2);
    assert_eq!(pool.write_count(), 2);
    assert_eq!(pool.dirty_flags(), vec![false, false, true]);

    // A second flush has nothing unpinned left to write
    let flushed = pool.flush_all().unwrap();
    assert_eq!(flushed, 0);
    assert_eq!(pool.write_count(), 2);

    pool.unpin(h2).unwrap();
}

#[test]
fn repin_is_a_hit_with_identical_bytes() {
    let dir = tempdir().unwrap();
    let path = create_stamped_file(&dir, 4);
    let mut pool = open_pool(&path, 3, ReplacementPolicy::Lru);

    let h2 = pin(&mut pool, 2);
    let first = pool.data(&h2).unwrap().to_vec();
    pool.unpin(h2).unwrap();

    let h2 = pin(&mut pool, 2);
    assert_eq!(pool.data(&h2).unwrap(), first.as_slice());
    assert_eq!(&first[..2], b"P2");

    // The second pin was served from memory
    assert_eq!(pool.read_count(), 1);
    pool.unpin(h2).unwrap();
}

#[test]
fn mark_dirty_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = create_stamped_file(&dir, 4);
    let mut pool = open_pool(&path, 2, ReplacementPolicy::Fifo);

    let h0 = pin(&mut pool, 0);
    pool.mark_dirty(&h0).unwrap();
    pool.mark_dirty(&h0).unwrap();
    pool.unpin(h0).unwrap();

    // One dirty frame means one write
    assert_eq!(pool.flush_all().unwrap(), 1);
    assert_eq!(pool.write_count(), 1);
}

#[test]
fn pin_of_resident_page_reuses_its_frame() {
    let dir = tempdir().unwrap();
    let path = create_stamped_file(&dir, 4);
    let mut pool = open_pool(&path, 3, ReplacementPolicy::Fifo);

    let h = pin(&mut pool, 1);
    let h_again = pin(&mut pool, 1);

    // One slot, two pins, no duplicate residents
    assert_eq!(pool.occupied(), 1);
    assert_eq!(pool.fix_counts(), vec![2, 0, 0]);
    assert_eq!(
        pool.frame_contents(),
        vec![PageId::new(1), PageId::NO_PAGE, PageId::NO_PAGE]
    );

    pool.unpin(h).unwrap();
    pool.unpin(h_again).unwrap();
    assert_eq!(pool.fix_counts(), vec![0, 0, 0]);
}

#[test]
fn snapshots_always_cover_every_slot() {
    let dir = tempdir().unwrap();
    let path = create_stamped_file(&dir, 8);
    let mut pool = open_pool(&path, 5, ReplacementPolicy::Lru);

    assert_eq!(pool.frame_contents().len(), 5);
    assert_eq!(pool.dirty_flags().len(), 5);
    assert_eq!(pool.fix_counts().len(), 5);

    let h = pin(&mut pool, 3);
    assert_eq!(pool.frame_contents().len(), 5);
    assert_eq!(pool.dirty_flags().len(), 5);
    assert_eq!(pool.fix_counts().len(), 5);

    // Snapshots are detached copies: later mutation leaves them alone
    let before = pool.frame_contents();
    pool.unpin(h).unwrap();
    let h4 = pin(&mut pool, 4);
    assert_eq!(before[1], PageId::NO_PAGE);
    assert_ne!(pool.frame_contents()[1], PageId::NO_PAGE);
    pool.unpin(h4).unwrap();
}

#[test]
fn counters_only_grow() {
    let dir = tempdir().unwrap();
    let path = create_stamped_file(&dir, 8);
    let mut pool = open_pool(&path, 2, ReplacementPolicy::Clock);

    let mut last_reads = 0;
    let mut last_writes = 0;

    for round in 0..12u64 {
        let h = pin(&mut pool, round % 4);
        if round % 3 == 0 {
            pool.mark_dirty(&h).unwrap();
        }
        pool.unpin(h).unwrap();

        assert!(pool.read_count() >= last_reads);
        assert!(pool.write_count() >= last_writes);
        last_reads = pool.read_count();
        last_writes = pool.write_count();
    }
}

#[test]
fn balanced_pins_leave_no_fix_counts() {
    let dir = tempdir().unwrap();
    let path = create_stamped_file(&dir, 8);
    let mut pool = open_pool(&path, 3, ReplacementPolicy::Lru);

    let handles: Vec<_> = (0..3).map(|i| pin(&mut pool, i)).collect();
    let more: Vec<_> = (0..3).map(|i| pin(&mut pool, i)).collect();

    for h in handles.into_iter().chain(more) {
        pool.unpin(h).unwrap();
    }

    assert!(pool.fix_counts().iter().all(|&c| c == 0));
}

#[test]
fn eviction_round_trips_modified_pages() {
    let dir = tempdir().unwrap();
    let path = create_stamped_file(&dir, 6);
    let mut pool = open_pool(&path, 2, ReplacementPolicy::Lru);

    // Modify pages 0 and 1, then sweep pages 2..6 through the pool to
    // force both out.
    for i in 0..2u64 {
        let h = pin(&mut pool, i);
        let tag = format!("mod{i}");
        pool.data_mut(&h).unwrap()[..tag.len()].copy_from_slice(tag.as_bytes());
        pool.unpin(h).unwrap();
    }
    for i in 2..6u64 {
        let h = pin(&mut pool, i);
        pool.unpin(h).unwrap();
    }
    assert_eq!(pool.write_count(), 2);

    // Re-pinning reads the modified bytes back from disk
    for i in 0..2u64 {
        let h = pin(&mut pool, i);
        let tag = format!("mod{i}");
        assert_eq!(&pool.data(&h).unwrap()[..tag.len()], tag.as_bytes());
        pool.unpin(h).unwrap();
    }
}

#[test]
fn pin_extends_file_for_new_pages() {
    let dir = tempdir().unwrap();
    let path = create_stamped_file(&dir, 1);
    let mut pool = open_pool(&path, 2, ReplacementPolicy::Fifo);

    // Page 5 does not exist yet; the pool grows the file with zero pages
    let h = pin(&mut pool, 5);
    assert!(pool.data(&h).unwrap().iter().all(|&b| b == 0));
    pool.unpin(h).unwrap();

    let file = PageFile::open(&path, PAGE_SIZE).unwrap();
    assert_eq!(file.page_count().unwrap(), 6);
}

#[test]
fn clock_full_sweep_evicts_at_hand() {
    let dir = tempdir().unwrap();
    let path = create_stamped_file(&dir, 8);
    let mut pool = open_pool(&path, 3, ReplacementPolicy::Clock);

    for i in 1..=3u64 {
        let h = pin(&mut pool, i);
        pool.unpin(h).unwrap();
    }

    // Every reference bit is set, so the sweep clears all three and
    // wraps back to the hand position: page 1's slot.
    let h4 = pin(&mut pool, 4);
    assert_eq!(pool.frame_contents(), page_ids(&[4, 2, 3]));
    pool.unpin(h4).unwrap();
}

#[test]
fn stats_snapshot_reflects_activity() {
    let dir = tempdir().unwrap();
    let path = create_stamped_file(&dir, 6);
    let mut pool = open_pool(&path, 2, ReplacementPolicy::Lru);

    let h0 = pin(&mut pool, 0);
    let h0_again = pin(&mut pool, 0);
    let h1 = pin(&mut pool, 1);
    pool.mark_dirty(&h1).unwrap();

    let stats = pool.stats();
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.reads, 2);
    assert_eq!(stats.pinned_frames, 2);
    assert_eq!(stats.dirty_frames, 1);
    assert!((stats.hit_ratio() - 1.0 / 3.0).abs() < 1e-9);

    pool.unpin(h0).unwrap();
    pool.unpin(h0_again).unwrap();
    pool.unpin(h1).unwrap();

    // Evict both residents and check the eviction counter moved
    let h2 = pin(&mut pool, 2);
    let h3 = pin(&mut pool, 3);
    assert_eq!(pool.stats().evictions, 2);
    pool.unpin(h2).unwrap();
    pool.unpin(h3).unwrap();
}
