//! Hybrid incremental + geometric size-class computation.
//!
//! Maps an object size to a pool index (and back) with bounded factor
//! error. Sizes below `eff_size` classes grow by a fixed `granularity`
//! (the incremental region); beyond that, classes are grouped into
//! "decades" of `eff_size` classes each, where size doubles from one
//! decade to the next and grows by a constant additive delta within a
//! decade. This is the same shape jemalloc/tcmalloc use for their size
//! class tables, adapted to a `2^(1/2^k)` growth factor so `eff_size`
//! and the per-step delta are both powers of two.

/// A size-class table derived from a granularity, a minimum object size
/// and a desired geometric growth factor.
#[derive(Debug, Clone, Copy)]
pub struct SizeClass {
    granularity: usize,
    min_alloc: usize,
    requested_factor: f64,
    actual_factor: f64,
    /// Number of classes in the incremental region; also the number of
    /// classes per geometric decade. Always a power of two.
    eff_size: usize,
    /// `log2(eff_size)`.
    k: u32,
    /// Smallest size that belongs to the geometric region: `size(eff_size)`.
    base: usize,
}

impl SizeClass {
    /// Largest `k` this table will ever choose, bounding `eff_size` to
    /// 2^20 classes per decade even for pathologically small factors.
    const MAX_K: u32 = 20;

    /// Build a size-class table.
    ///
    /// `granularity` must be a power of two no smaller than the pointer
    /// size and `min_alloc` should be a multiple of it (debug-asserted);
    /// `requested_factor` must lie in `(1.0, 2.0]` (debug-asserted).
    /// Returns the table and the *realised* factor, which may differ
    /// from the requested one because `actual_factor` is constrained to
    /// the form `2^(1/2^k)`.
    pub fn new(granularity: usize, min_alloc: usize, requested_factor: f64) -> (Self, f64) {
        debug_assert!(granularity.is_power_of_two());
        debug_assert!(granularity >= std::mem::size_of::<usize>());
        debug_assert!(min_alloc % granularity == 0);
        debug_assert!(requested_factor > 1.0 && requested_factor <= 2.0);

        let log2_factor = requested_factor.log2();
        let k = (1.0 / log2_factor).log2().round();
        let k = if k.is_finite() { k.max(0.0) } else { 0.0 };
        let k = (k as u32).min(Self::MAX_K);
        let eff_size = 1usize << k;
        let actual_factor = 2f64.powf(1.0 / eff_size as f64);
        let base = min_alloc + eff_size * granularity;

        let table = Self {
            granularity,
            min_alloc,
            requested_factor,
            actual_factor,
            eff_size,
            k,
            base,
        };
        (table, actual_factor)
    }

    /// Realised geometric growth factor, of the form `2^(1/2^k)`.
    pub fn actual_factor(&self) -> f64 {
        self.actual_factor
    }

    /// Requested geometric growth factor, as passed to [`SizeClass::new`].
    pub fn requested_factor(&self) -> f64 {
        self.requested_factor
    }

    /// Number of classes per geometric decade (also the incremental
    /// region's length).
    pub fn eff_size(&self) -> usize {
        self.eff_size
    }

    /// Exact object size served by class `c`.
    pub fn size_by_class(&self, c: usize) -> usize {
        if c < self.eff_size {
            self.min_alloc + c * self.granularity
        } else {
            let (base_of_decade, delta) = self.decade_params(c);
            let r = c % self.eff_size;
            base_of_decade + r * delta
        }
    }

    /// Smallest class `c` with `size_by_class(c) >= s`.
    pub fn class_by_size(&self, s: usize) -> usize {
        if s <= self.min_alloc {
            return 0;
        }
        if s <= self.base {
            // Incremental region: size(c) = min_alloc + c*granularity.
            let c = (s - self.min_alloc + self.granularity - 1) / self.granularity;
            return c.min(self.eff_size);
        }

        // Geometric region. `ratio = s / base` locates the decade: decade
        // g (1-indexed) covers sizes in [base << (g-1), base << g). Since
        // base, s are positive integers, floor(s / base) always lands in
        // the same power-of-two bracket as the real quotient, so
        // `ilog2` on the integer ratio is exact.
        let ratio = s / self.base;
        let g_minus_1 = ratio.max(1).ilog2();
        let mut c = (g_minus_1 as usize + 1) * self.eff_size;
        let (base_of_decade, delta) = self.decade_params(c);
        let r = (s - base_of_decade + delta - 1) / delta;
        c += r.min(self.eff_size);

        // Bounded nudge to absorb any rounding edge case: at most a
        // couple of steps since `r` above is already within one class of
        // exact.
        while self.size_by_class(c) < s {
            c += 1;
        }
        while c > self.eff_size && self.size_by_class(c - 1) >= s {
            c -= 1;
        }
        c
    }

    /// `(base_of_decade, delta)` for the decade that class `c` (>= eff_size)
    /// belongs to.
    fn decade_params(&self, c: usize) -> (usize, usize) {
        let g_minus_1 = (c / self.eff_size).saturating_sub(1);
        let base_of_decade = self.base << g_minus_1;
        let delta = base_of_decade >> self.k;
        (base_of_decade, delta)
    }
}
