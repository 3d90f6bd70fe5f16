//! The slab cache: the egress dependency the rest of this crate treats as
//! an external collaborator in the distilled spec, implemented here as a
//! thin arena over the system allocator.
//!
//! Hands out page-aligned slabs by slab order, and a direct path for
//! large (over-`objsize_max`) allocations. Single-threaded: no locking,
//! matching the allocator's single-threaded-per-instance contract.

use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

/// Page alignment used for every slab and large allocation.
const SLAB_ALIGN: usize = 4096;

/// Arena of fixed-size slabs, one size per slab order, plus a direct
/// large-allocation path.
pub struct SlabCache {
    /// Slab size in bytes, indexed by slab order.
    slab_orders: Vec<usize>,
    /// Total bytes currently handed out (slabs + large allocations), used
    /// to check the leak-freedom property against `stats()` totals.
    in_use_bytes: usize,
}

impl SlabCache {
    /// Create a slab cache supporting the given slab-order sizes. Each
    /// size must be a power of two and at least `SLAB_ALIGN`.
    pub fn new(slab_orders: Vec<usize>) -> Self {
        debug_assert!(!slab_orders.is_empty());
        for &size in &slab_orders {
            debug_assert!(size.is_power_of_two());
            debug_assert!(size >= SLAB_ALIGN);
        }
        Self {
            slab_orders,
            in_use_bytes: 0,
        }
    }

    /// Slab size in bytes for the given order.
    pub fn slab_order_size(&self, order: usize) -> usize {
        self.slab_orders[order]
    }

    /// Number of slab orders this cache was configured with.
    pub fn num_orders(&self) -> usize {
        self.slab_orders.len()
    }

    /// Acquire one slab of the given order from the system allocator.
    /// Slabs are self-aligned (aligned to their own size) so that
    /// [`crate::mempool::slab_base`] can recover a slab's base address
    /// from any interior pointer with a single mask.
    pub fn acquire(&mut self, order: usize) -> Option<NonNull<u8>> {
        let size = self.slab_order_size(order);
        let ptr = self.raw_alloc(size, size)?;
        self.in_use_bytes += size;
        Some(ptr)
    }

    /// Release a slab previously returned by [`SlabCache::acquire`] for
    /// the same order.
    ///
    /// # Safety
    /// `ptr` must have been obtained from `acquire(order)` and not
    /// already released.
    pub unsafe fn release(&mut self, order: usize, ptr: NonNull<u8>) {
        let size = self.slab_order_size(order);
        self.raw_dealloc(ptr, size, size);
        self.in_use_bytes -= size;
    }

    /// Acquire a direct large allocation of at least `size` bytes,
    /// rounded up to the slab alignment. Large allocations are never
    /// masked back to a base address, so page alignment suffices.
    pub fn acquire_large(&mut self, size: usize) -> Option<NonNull<u8>> {
        let rounded = crate::util::layout::align_up(size.max(1), SLAB_ALIGN);
        let ptr = self.raw_alloc(rounded, SLAB_ALIGN)?;
        self.in_use_bytes += rounded;
        Some(ptr)
    }

    /// Release a direct large allocation of the given originally
    /// requested `size`.
    ///
    /// # Safety
    /// `ptr` must have been obtained from `acquire_large(size)`.
    pub unsafe fn release_large(&mut self, ptr: NonNull<u8>, size: usize) {
        let rounded = crate::util::layout::align_up(size.max(1), SLAB_ALIGN);
        self.raw_dealloc(ptr, rounded, SLAB_ALIGN);
        self.in_use_bytes -= rounded;
    }

    /// Total bytes currently outstanding (slabs + large allocations).
    pub fn in_use_bytes(&self) -> usize {
        self.in_use_bytes
    }

    fn raw_alloc(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let layout = Layout::from_size_align(size, align).ok()?;
        // SAFETY: layout has non-zero size and valid alignment.
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr)
    }

    unsafe fn raw_dealloc(&self, ptr: NonNull<u8>, size: usize, align: usize) {
        let layout = Layout::from_size_align(size, align)
            .expect("size/align was valid at allocation time");
        dealloc(ptr.as_ptr(), layout);
    }
}
