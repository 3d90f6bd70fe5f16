//! Optional tracing of activation/GC/OOM events.
//!
//! Compiled to no-ops unless the `log` feature is enabled — this crate
//! does not force a logging backend on its users.

#[cfg(feature = "log")]
pub(crate) fn pool_activated(pool_idx: usize, waste: usize, group_mask: u32) {
    log::debug!(
        "pool {} activated (waste={}, group active mask={:#010b})",
        pool_idx,
        waste,
        group_mask
    );
}

#[cfg(not(feature = "log"))]
#[inline]
pub(crate) fn pool_activated(_pool_idx: usize, _waste: usize, _group_mask: u32) {}

#[cfg(feature = "log")]
pub(crate) fn gc_batch_drained(items: usize, mode_now: crate::gc::FreeMode) {
    log::trace!("gc batch drained {} items, mode now {:?}", items, mode_now);
}

#[cfg(not(feature = "log"))]
#[inline]
pub(crate) fn gc_batch_drained(_items: usize, _mode_now: crate::gc::FreeMode) {}

#[cfg(feature = "log")]
pub(crate) fn oom(requested_size: usize, slab_order: usize) {
    log::warn!("oom: size={} slab_order={}", requested_size, slab_order);
}

#[cfg(not(feature = "log"))]
#[inline]
pub(crate) fn oom(_requested_size: usize, _slab_order: usize) {}
