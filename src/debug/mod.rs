//! Debug utilities for tracking allocations.
//!
//! Only compiled when the `debug` feature is enabled.

pub(crate) mod poison;
