//! Buffer pool configuration.

use tundra_common::constants::{
    DEFAULT_PAGE_SIZE, DEFAULT_POOL_FRAMES, MAX_PAGE_SIZE, MIN_BUFFER_POOL_SIZE, MIN_PAGE_SIZE,
    MIN_POOL_FRAMES,
};

use super::eviction::ReplacementPolicy;

/// Configuration for the buffer pool.
#[derive(Debug, Clone)]
pub struct BufferPoolConfig {
    /// Number of page frames in the buffer pool.
    pub capacity: usize,
    /// Page size in bytes.
    pub page_size: usize,
    /// Page replacement policy.
    pub policy: ReplacementPolicy,
}

impl BufferPoolConfig {
    /// Creates a new configuration with the specified number of frames.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            page_size: DEFAULT_PAGE_SIZE,
            policy: ReplacementPolicy::default(),
        }
    }

    /// Creates a configuration from a memory size in bytes.
    pub fn from_memory_size(memory_bytes: usize) -> Self {
        let memory_bytes = memory_bytes.max(MIN_BUFFER_POOL_SIZE);
        Self::new(memory_bytes / DEFAULT_PAGE_SIZE)
    }

    /// Creates a default configuration.
    pub fn default_config() -> Self {
        Self::new(DEFAULT_POOL_FRAMES)
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the replacement policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ReplacementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the total memory used by the frame buffers.
    pub fn memory_usage(&self) -> usize {
        self.capacity * self.page_size
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.capacity < MIN_POOL_FRAMES {
            return Err("capacity must be at least one frame");
        }
        if !self.page_size.is_power_of_two() {
            return Err("page_size must be a power of 2");
        }
        if self.page_size < MIN_PAGE_SIZE {
            return Err("page_size below minimum");
        }
        if self.page_size > MAX_PAGE_SIZE {
            return Err("page_size above maximum");
        }
        Ok(())
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
