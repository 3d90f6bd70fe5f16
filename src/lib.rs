//! # smallalloc
//!
//! A small-object slab allocator with a hybrid incremental/geometric
//! size-class table, redirect-and-reconcile waste accounting, and an
//! incremental delayed-free garbage collector.
//!
//! Allocations below [`SmallAlloc::objsize_max`] are served by one of a
//! fixed table of per-size-class pools, each backed by page-aligned
//! slabs from a shared [`SlabCache`]. Pools are grouped in batches that
//! share a slab size; within a group, small requests are initially
//! redirected to the group's largest (always-active) pool, and a pool
//! only pays for its own slabs once enough redirected waste has
//! accumulated against it. Requests above `objsize_max` go straight to
//! a direct large-allocation path on the same cache.
//!
//! ## Quick start
//!
//! ```rust
//! use smallalloc::{AllocatorConfig, SmallAlloc};
//!
//! let (mut alloc, actual_factor) = SmallAlloc::create(AllocatorConfig::default());
//! println!("realised growth factor: {actual_factor}");
//!
//! let ptr = alloc.smalloc(40).expect("oom");
//! alloc.smfree(ptr, 40);
//! ```
//!
//! ## Single-threaded
//!
//! Every type in this crate is `!Send`/`!Sync` by construction (no
//! locking primitives anywhere in the data path) — one [`SmallAlloc`]
//! instance serves one thread.

mod alloc;
mod config;
#[cfg(feature = "debug")]
mod debug;
mod diagnostics;
mod gc;
mod group;
mod mempool;
mod pool;
mod size_class;
mod slab_cache;
mod stats;
mod util;

pub use alloc::{AllocOption, SmallAlloc};
pub use config::AllocatorConfig;
pub use gc::FreeMode;
pub use mempool::PoolStats;
pub use stats::AllocStats;
