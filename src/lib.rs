//! Exact frequency ranking for keyed event streams.
//!
//! `freqrank` counts how often each key occurs and reports the K most
//! frequent keys on demand. Increments are amortized O(1) and top-K queries
//! cost O(output), not O(population): keys are grouped into per-count
//! buckets and the populated counts are kept linked in order, so a query
//! walks down from the highest bucket instead of sorting anything.
//!
//! Counts are exact, not sketched, so memory grows with the number of
//! distinct keys. Typical uses are rate-limiter accounting,
//! most-active-client views, and frequency-based eviction.

mod buckets;
mod tracker;

pub use tracker::{FreqRank, Ranked};
