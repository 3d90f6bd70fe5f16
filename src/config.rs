//! Allocator configuration.

use crate::util::size::mb;

/// Configuration for [`crate::SmallAlloc`].
///
/// Covers the classifier parameters (`min_alloc`, `granularity`,
/// `requested_factor`) plus the slab-order table handed to the slab
/// cache this allocator builds for itself.
#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    /// Smallest object size the classifier recognises (bytes).
    pub min_alloc: usize,

    /// Power-of-two alignment unit; must be >= pointer size.
    pub granularity: usize,

    /// Desired geometric growth factor, `1 < factor <= 2`.
    pub requested_factor: f64,

    /// Slab sizes (bytes), one per slab order, smallest first. Each must be
    /// a power of two.
    pub slab_orders: Vec<usize>,

    /// Total number of size-class pools to build. Pools are partitioned
    /// into groups of at most [`crate::group::MAX_GROUP_SIZE`]; group `i`
    /// is backed by `slab_orders[i]` (the last slab order is reused for
    /// any further groups once `slab_orders` is exhausted).
    pub num_pools: usize,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            min_alloc: 16,
            granularity: std::mem::size_of::<usize>(),
            requested_factor: 1.1,
            slab_orders: vec![mb(4)],
            num_pools: 64,
        }
    }
}

impl AllocatorConfig {
    /// Create a minimal config for tests or constrained environments.
    pub fn minimal() -> Self {
        Self {
            min_alloc: 8,
            granularity: std::mem::size_of::<usize>(),
            requested_factor: 1.3,
            slab_orders: vec![crate::util::size::kb(64)],
            num_pools: 32,
        }
    }

    /// Builder pattern: set the minimum allocation size.
    pub fn with_min_alloc(mut self, min_alloc: usize) -> Self {
        self.min_alloc = min_alloc;
        self
    }

    /// Builder pattern: set the classifier granularity.
    pub fn with_granularity(mut self, granularity: usize) -> Self {
        self.granularity = granularity;
        self
    }

    /// Builder pattern: set the requested geometric factor.
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.requested_factor = factor;
        self
    }

    /// Builder pattern: set the slab-order size table.
    pub fn with_slab_orders(mut self, orders: Vec<usize>) -> Self {
        self.slab_orders = orders;
        self
    }

    /// Builder pattern: set the total number of size-class pools.
    pub fn with_num_pools(mut self, num_pools: usize) -> Self {
        self.num_pools = num_pools;
        self
    }
}
