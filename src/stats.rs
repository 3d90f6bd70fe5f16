//! Iteration over pools and aggregated statistics.

use std::ops::ControlFlow;

use crate::mempool::PoolStats;
use crate::util::size::format_bytes;

/// Aggregated totals across every pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Bytes currently in use across all pools.
    pub used: usize,
    /// Bytes reserved (live slabs) across all pools.
    pub total: usize,
}

impl std::fmt::Display for AllocStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "used {} / total {}", format_bytes(self.used), format_bytes(self.total))
    }
}

/// Walk every pool in index order, aggregating `used`/`total` and
/// invoking `visitor` with each pool's stats. Iteration stops early if
/// `visitor` returns [`ControlFlow::Break`].
pub fn collect<'a>(
    pools: impl Iterator<Item = &'a PoolStats>,
    mut visitor: impl FnMut(&PoolStats) -> ControlFlow<()>,
) -> AllocStats {
    let mut totals = AllocStats::default();
    for stats in pools {
        totals.used += stats.used;
        totals.total += stats.total;
        if visitor(stats).is_break() {
            break;
        }
    }
    totals
}
