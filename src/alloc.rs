//! `SmallAlloc`: the allocator facade tying the size classifier, pool
//! groups, mempools and the GC queue together.
//!
//! This mirrors a `create`/`alloc`/`free` entry-point API as a single
//! owning struct instead of a set of free functions operating on an
//! opaque handle — the usual translation for a single-threaded,
//! non-`'static` Rust type.

use std::ops::ControlFlow;
use std::ptr::NonNull;

use crate::config::AllocatorConfig;
use crate::diagnostics;
use crate::gc::{DelayedQueues, FreeMode};
use crate::group::{Group, MAX_GROUP_SIZE};
use crate::mempool::{self, Mempool, PoolStats};
use crate::pool::SmallPool;
use crate::size_class::SizeClass;
use crate::slab_cache::SlabCache;
use crate::stats::{self, AllocStats};

/// Options accepted by [`SmallAlloc::set_option`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocOption {
    /// Turn delayed-free mode on or off. Turning it off schedules an
    /// incremental drain of whatever is still quarantined (see
    /// [`crate::gc`]) rather than freeing it all at once.
    DelayedFreeMode(bool),
}

/// A small-object slab allocator.
///
/// Owns an ordered table of [`SmallPool`]/[`Mempool`] pairs (one per
/// size class), partitioned into [`Group`]s of at most
/// [`MAX_GROUP_SIZE`] pools that share a slab order, plus the
/// [`SlabCache`] backing all of them and the [`DelayedQueues`] used in
/// delayed-free mode. Allocations above the largest size class fall
/// through to a direct page-aligned path on the same cache.
pub struct SmallAlloc {
    cache: SlabCache,
    size_class: SizeClass,
    pools: Vec<SmallPool>,
    mempools: Vec<Mempool>,
    groups: Vec<Group>,
    /// Largest size served by a size-class pool; strictly larger
    /// requests go straight to the slab cache's large-allocation path.
    objsize_max: usize,
    free_mode: FreeMode,
    delayed: DelayedQueues,
}

impl SmallAlloc {
    /// Build an allocator from `config`. Returns the allocator and the
    /// realised geometric factor (see [`SizeClass::new`]).
    pub fn create(config: AllocatorConfig) -> (Self, f64) {
        assert!(!config.slab_orders.is_empty(), "need at least one slab order");
        assert!(config.num_pools > 0, "need at least one pool");

        let (size_class, actual_factor) =
            SizeClass::new(config.granularity, config.min_alloc, config.requested_factor);

        let cache = SlabCache::new(config.slab_orders);
        let num_pools = config.num_pools;

        let mut pools = Vec::with_capacity(num_pools);
        let mut mempools = Vec::with_capacity(num_pools);
        let mut groups = Vec::new();

        let mut next = 0;
        while next < num_pools {
            let group_idx = groups.len();
            let group_len = (num_pools - next).min(MAX_GROUP_SIZE);
            let first = next;
            let last = next + group_len - 1;
            let slab_order = group_idx.min(cache.num_orders() - 1);
            let slab_size = cache.slab_order_size(slab_order);

            let group = Group::new(first, last, slab_size);

            for local_idx in 0..group_len {
                let global_idx = first + local_idx;
                let objsize = size_class.size_by_class(global_idx);
                let objsize_min = if global_idx == 0 {
                    1
                } else {
                    pools[global_idx - 1].objsize + 1
                };
                let appropriate_pool_mask = group.appropriate_mask_from(local_idx);

                pools.push(SmallPool {
                    objsize,
                    objsize_min,
                    slab_order,
                    group: group_idx,
                    local_idx,
                    used_pool: last,
                    appropriate_pool_mask,
                    waste: 0,
                });
                mempools.push(Mempool::new(objsize, slab_order, global_idx));
            }

            groups.push(group);
            next += group_len;
        }

        let objsize_max = pools.last().expect("num_pools > 0").objsize;
        let delayed = DelayedQueues::new(num_pools);

        let alloc = Self {
            cache,
            size_class,
            pools,
            mempools,
            groups,
            objsize_max,
            free_mode: FreeMode::Free,
            delayed,
        };
        (alloc, actual_factor)
    }

    /// Largest size served by a size-class pool.
    pub fn objsize_max(&self) -> usize {
        self.objsize_max
    }

    /// Realised geometric growth factor.
    pub fn actual_factor(&self) -> f64 {
        self.size_class.actual_factor()
    }

    /// Allocate `size` bytes. `None` on OOM. Sizes above
    /// [`SmallAlloc::objsize_max`] are served directly from the slab
    /// cache's large-allocation path, bypassing size classification.
    pub fn smalloc(&mut self, size: usize) -> Option<NonNull<u8>> {
        debug_assert!(size > 0, "smalloc(0) is caller error");

        self.gc_step();

        if size > self.objsize_max {
            return self.cache.acquire_large(size);
        }

        let cls = self.size_class.class_by_size(size);
        let target = self.pools[cls].used_pool;

        let ptr = match self.mempools[target].alloc(&mut self.cache) {
            Some(ptr) => ptr,
            None => {
                diagnostics::oom(size, self.pools[cls].slab_order);
                return None;
            }
        };

        if target != cls {
            let served_objsize = self.pools[target].objsize;
            self.pools[cls].record_alloc_redirect(served_objsize);

            let waste_max = self.groups[self.pools[cls].group].waste_max;
            if self.pools[cls].should_activate(waste_max) {
                self.activate(cls);
            }
        }

        Some(ptr)
    }

    /// Free `ptr`, previously returned by [`SmallAlloc::smalloc`] for
    /// `size` bytes. Frees immediately regardless of the current
    /// [`FreeMode`]; use [`SmallAlloc::smfree_delayed`] to respect it.
    pub fn smfree(&mut self, ptr: NonNull<u8>, size: usize) {
        debug_assert!(size > 0, "smfree(_, 0) is caller error");

        if size > self.objsize_max {
            // SAFETY: `ptr` was obtained from `cache.acquire_large(size)`
            // in `smalloc`, since only oversized requests take this path.
            unsafe { self.cache.release_large(ptr, size) };
            return;
        }

        self.free_classified(self.size_class.class_by_size(size), ptr);
    }

    /// Free `ptr` (previously returned by [`SmallAlloc::smalloc`] for
    /// `size` bytes), honouring the current [`FreeMode`]: quarantines
    /// the pointer instead of freeing it while delayed-free mode is on.
    pub fn smfree_delayed(&mut self, ptr: NonNull<u8>, size: usize) {
        debug_assert!(size > 0, "smfree_delayed(_, 0) is caller error");

        if self.free_mode != FreeMode::DelayedFree {
            self.smfree(ptr, size);
            return;
        }

        if size > self.objsize_max {
            self.delayed.push_large(ptr, size);
        } else {
            self.delayed.push(self.size_class.class_by_size(size), ptr);
        }
    }

    /// Apply an allocator-wide option.
    pub fn set_option(&mut self, option: AllocOption) {
        match option {
            AllocOption::DelayedFreeMode(true) => self.free_mode = FreeMode::DelayedFree,
            AllocOption::DelayedFreeMode(false) => self.free_mode = FreeMode::CollectGarbage,
        }
    }

    /// Aggregate usage across every pool, visiting each pool's snapshot
    /// in index order. Iteration stops early if `visitor` returns
    /// [`ControlFlow::Break`].
    pub fn stats(&self, mut visitor: impl FnMut(&PoolStats) -> ControlFlow<()>) -> AllocStats {
        let snapshots: Vec<PoolStats> = self.mempools.iter().map(|m| m.stats(&self.cache)).collect();
        stats::collect(snapshots.iter(), |s| visitor(s))
    }

    /// Free `ptr`, originally classified to pool `cls`, reconciling
    /// redirect waste against whichever pool actually served it.
    fn free_classified(&mut self, cls: usize, ptr: NonNull<u8>) {
        let slab_size = self.cache.slab_order_size(self.pools[cls].slab_order);
        let actual = mempool::owner_of(ptr, slab_size);

        if actual != cls {
            let actual_objsize = self.pools[actual].objsize;
            self.pools[cls].record_free_reconcile(actual_objsize);
        }

        self.mempools[actual].free(&mut self.cache, ptr);
    }

    /// Activate pool `cls` (it has accumulated enough redirect waste to
    /// serve its own size itself) and re-route every pool in its group
    /// with an equal or smaller objsize, per the group's routing rule.
    fn activate(&mut self, cls: usize) {
        let group_idx = self.pools[cls].group;
        let local_idx = self.pools[cls].local_idx;

        self.groups[group_idx].activate(local_idx);
        let group = self.groups[group_idx];
        diagnostics::pool_activated(cls, self.pools[cls].waste, group.active_pool_mask);

        for q_local in 0..=local_idx {
            let q_global = group.first + q_local;
            let target_local = group.routing_target(self.pools[q_global].appropriate_pool_mask);
            self.pools[q_global].used_pool = group.first + target_local;
        }
    }

    /// Drain up to one GC batch while in [`FreeMode::CollectGarbage`],
    /// falling back to [`FreeMode::Free`] once the quarantine empties.
    /// No-op in the other two modes.
    fn gc_step(&mut self) {
        if self.free_mode != FreeMode::CollectGarbage {
            return;
        }

        let large_batch = self.delayed.drain_large_batch();
        if !large_batch.is_empty() {
            let n = large_batch.len();
            for (ptr, size) in large_batch {
                // SAFETY: queued only from `smfree_delayed`'s large path.
                unsafe { self.cache.release_large(ptr, size) };
            }
            diagnostics::gc_batch_drained(n, self.free_mode);
            return;
        }

        let pool_batch = self.delayed.drain_pool_batch();
        if !pool_batch.is_empty() {
            let n = pool_batch.len();
            for (cls, ptr) in pool_batch {
                self.free_classified(cls, ptr);
            }
            diagnostics::gc_batch_drained(n, self.free_mode);
            return;
        }

        self.free_mode = FreeMode::Free;
    }
}

impl Drop for SmallAlloc {
    fn drop(&mut self) {
        // Outstanding delayed large allocations are reclaimed
        // unconditionally; mempools still holding slabs at this point
        // trip the debug_assert in `Mempool::drop` (a live-object leak,
        // i.e. caller error, not something this allocator can recover
        // from on its own).
        for (ptr, size) in self.delayed.take_all_large() {
            // SAFETY: queued only from `smfree_delayed`'s large path.
            unsafe { self.cache.release_large(ptr, size) };
        }
    }
}
