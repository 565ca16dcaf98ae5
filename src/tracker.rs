use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use ahash::RandomState;

use crate::buckets::BucketChain;

/// A key together with its exact count, as returned by
/// [`FreqRank::top_entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked<T> {
    pub key: T,
    pub count: u64,
}

/// Exact frequency rank tracker.
///
/// Counts every occurrence of every key and answers "which K keys occurred
/// most often" without sorting the key population. Two structures cooperate:
/// a key -> count map for point lookups, and a bucket chain grouping keys
/// by count with the populated counts linked in order. [`record`] moves a
/// key between at most two adjacent buckets, so it is amortized O(1) no
/// matter how many keys or distinct counts exist; [`top`] walks buckets from
/// the highest count down and stops as soon as `k` keys are out.
///
/// Keys sharing a count are ranked by when they reached it: earliest first.
/// The order is deterministic for a given record sequence.
///
/// All operations are total. An internal inconsistency between the two
/// structures is a logic fault and panics rather than producing a wrong
/// ranking.
///
/// The tracker is a single-writer structure: `record` takes `&mut self` and
/// the cross-structure invariants only hold between calls. Share it across
/// threads behind a lock, never by splitting a record mid-flight.
///
/// [`record`]: FreqRank::record
/// [`top`]: FreqRank::top
pub struct FreqRank<T> {
    counts: HashMap<T, u64, RandomState>,
    chain: BucketChain<T>,
}

impl<T: Hash + Eq + Clone> FreqRank<T> {
    pub fn new() -> Self {
        FreqRank {
            counts: HashMap::default(),
            chain: BucketChain::new(),
        }
    }

    /// Pre-allocates for roughly `capacity` distinct keys.
    pub fn with_capacity(capacity: usize) -> Self {
        FreqRank {
            counts: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            chain: BucketChain::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    /// Records one occurrence of `key`.
    ///
    /// A first-seen key enters at count 1; an already-tracked key moves from
    /// its current bucket to the next one up, collapsing the old bucket if
    /// it empties. Amortized O(1).
    pub fn record(&mut self, key: T) {
        self.record_by(key, 1);
    }

    /// Records `by` occurrences of `key` as a single bucket transition.
    ///
    /// Equivalent to calling [`record`](Self::record) `by` times, but the
    /// key jumps straight to its final bucket. A no-op when `by == 0`.
    /// Costs O(populated counts crossed by the jump); O(1) for `by == 1`.
    pub fn record_by(&mut self, key: T, by: u64) {
        if by == 0 {
            return;
        }
        match self.counts.get_mut(&key) {
            Some(count) => {
                let old = *count;
                let new = old + by;
                *count = new;
                self.chain.promote(&key, old, new);
            }
            None => {
                self.counts.insert(key.clone(), by);
                self.chain.insert(key, by);
            }
        }
    }

    /// Exact count for `key`; 0 if it was never recorded.
    pub fn count<Q>(&self, key: &Q) -> u64
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.contains_key(key)
    }

    /// Number of distinct keys recorded so far.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Number of distinct counts currently populated.
    pub fn distinct_counts(&self) -> usize {
        self.chain.distinct_counts()
    }

    /// Highest count held by any key, if any key was recorded.
    pub fn max_count(&self) -> Option<u64> {
        self.chain.max_count()
    }

    /// Lowest count held by any key, if any key was recorded.
    pub fn min_count(&self) -> Option<u64> {
        self.chain.min_count()
    }

    /// The `min(k, len)` keys with the highest counts, descending, ties in
    /// arrival order. `top(0)` is empty; `k` past the population returns
    /// every key. Cost is proportional to the output, not the population.
    pub fn top(&self, k: usize) -> Vec<T> {
        self.iter_ranked().take(k).map(|(key, _)| key.clone()).collect()
    }

    /// Like [`top`](Self::top), but pairs each key with its count.
    pub fn top_entries(&self, k: usize) -> Vec<Ranked<T>> {
        self.iter_ranked()
            .take(k)
            .map(|(key, count)| Ranked {
                key: key.clone(),
                count,
            })
            .collect()
    }

    /// Lazy descending walk over all `(key, count)` pairs: highest count
    /// first, arrival order within a count.
    pub fn iter_ranked(&self) -> impl Iterator<Item = (&T, u64)> {
        self.chain.iter()
    }

    /// Discards everything, returning the tracker to its initial state.
    pub fn clear(&mut self) {
        self.counts.clear();
        self.chain.clear();
    }

    /// Asserts the cross-structure invariants: the bucket chain partitions
    /// exactly the tracked keys, and each key sits in the bucket matching
    /// its count. Compiled only for tests and debug builds.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.chain.validate();
        assert_eq!(self.counts.len(), self.chain.len());
        let mut last_count = u64::MAX;
        for (key, count) in self.chain.iter() {
            assert!(count <= last_count, "ranked walk not descending");
            last_count = count;
            assert_eq!(self.counts.get(key), Some(&count), "bucket disagrees with count");
        }
    }
}

impl<T: Hash + Eq + Clone> Default for FreqRank<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_counts_match_record_calls() {
        let mut tracker = FreqRank::new();
        for _ in 0..3 {
            tracker.record("a");
        }
        tracker.record("b");

        assert_eq!(tracker.count("a"), 3);
        assert_eq!(tracker.count("b"), 1);
        assert_eq!(tracker.count("never"), 0);
        assert!(tracker.contains("a"));
        assert!(!tracker.contains("never"));
        assert_eq!(tracker.len(), 2);
        tracker.debug_validate_invariants();
    }

    #[test]
    fn test_top_orders_by_descending_count() {
        let mut tracker = FreqRank::new();
        for _ in 0..3 {
            tracker.record("A");
        }
        for _ in 0..5 {
            tracker.record("B");
        }
        tracker.record("C");

        assert_eq!(tracker.top(2), vec!["B", "A"]);
        assert_eq!(tracker.top(3), vec!["B", "A", "C"]);
        let entries = tracker.top_entries(3);
        assert_eq!(
            entries,
            vec![
                Ranked { key: "B", count: 5 },
                Ranked { key: "A", count: 3 },
                Ranked { key: "C", count: 1 },
            ]
        );
        tracker.debug_validate_invariants();
    }

    #[test]
    fn test_ties_rank_by_arrival_at_count() {
        let mut tracker = FreqRank::new();
        tracker.record("A");
        tracker.record("A");
        tracker.record("B");
        tracker.record("B");

        // "A" reached count 2 first, so it wins the tie.
        assert_eq!(tracker.top(1), vec!["A"]);
        assert_eq!(tracker.top(5), vec!["A", "B"]);

        // Interleaved the other way round, "B" gets to 2 first.
        let mut tracker = FreqRank::new();
        tracker.record("B");
        tracker.record("A");
        tracker.record("B");
        tracker.record("A");
        assert_eq!(tracker.top(2), vec!["B", "A"]);
    }

    #[test]
    fn test_top_zero_is_empty() {
        let mut tracker = FreqRank::new();
        assert!(tracker.top(0).is_empty());
        tracker.record("x");
        assert!(tracker.top(0).is_empty());
    }

    #[test]
    fn test_top_beyond_population_returns_all() {
        let mut tracker = FreqRank::new();
        tracker.record("a");
        tracker.record("b");
        assert_eq!(tracker.top(100).len(), 2);
    }

    #[test]
    fn test_truncation_inside_a_bucket() {
        let mut tracker = FreqRank::new();
        for key in ["a", "b", "c", "d"] {
            tracker.record(key);
            tracker.record(key);
        }
        tracker.record("e");

        // Bucket 2 has four members in arrival order; only two fit.
        assert_eq!(tracker.top(2), vec!["a", "b"]);
        assert_eq!(tracker.top(5), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_repeated_key_keeps_single_bucket() {
        let mut tracker = FreqRank::new();
        for _ in 0..256 {
            tracker.record("10.0.0.1");
        }

        assert_eq!(tracker.count("10.0.0.1"), 256);
        // Every transition collapsed the previous bucket.
        assert_eq!(tracker.distinct_counts(), 1);
        assert_eq!(tracker.max_count(), Some(256));
        assert_eq!(tracker.top(1), vec!["10.0.0.1"]);
        tracker.debug_validate_invariants();
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut tracker = FreqRank::new();
        for _ in 0..4 {
            tracker.record("a");
        }
        tracker.record("b");

        tracker.clear();
        assert!(tracker.is_empty());
        assert!(tracker.top(10).is_empty());
        assert_eq!(tracker.count("a"), 0);
        assert_eq!(tracker.max_count(), None);
        tracker.debug_validate_invariants();

        // Recording after clear behaves like the very first call.
        tracker.record("a");
        assert_eq!(tracker.count("a"), 1);
        assert_eq!(tracker.top(1), vec!["a"]);
    }

    #[test]
    fn test_record_by_matches_repeated_record() {
        let mut bulk = FreqRank::new();
        let mut single = FreqRank::new();

        bulk.record_by("x", 5);
        bulk.record("y");
        bulk.record_by("x", 2);
        bulk.record_by("z", 0); // no-op

        for _ in 0..5 {
            single.record("x");
        }
        single.record("y");
        for _ in 0..2 {
            single.record("x");
        }

        assert_eq!(bulk.count("x"), 7);
        assert_eq!(bulk.count("z"), 0);
        assert_eq!(bulk.len(), single.len());
        assert_eq!(bulk.top(10), single.top(10));
        bulk.debug_validate_invariants();
    }

    #[test]
    fn test_owned_string_keys_with_borrowed_lookup() {
        let mut tracker: FreqRank<String> = FreqRank::new();
        tracker.record("hello".to_string());
        tracker.record("hello".to_string());
        tracker.record("world".to_string());

        assert_eq!(tracker.count("hello"), 2);
        assert!(tracker.contains("world"));
        assert_eq!(tracker.top(1), vec!["hello".to_string()]);
    }

    #[test]
    fn test_iter_ranked_is_lazy_and_complete() {
        let mut tracker = FreqRank::new();
        for i in 0..20u64 {
            tracker.record_by(i, i + 1);
        }

        let mut seen = 0;
        for (key, count) in tracker.iter_ranked() {
            assert_eq!(count, key + 1);
            seen += 1;
        }
        assert_eq!(seen, 20);

        // The first entry comes off the top bucket without visiting the rest.
        let first = tracker.iter_ranked().next().unwrap();
        assert_eq!(first, (&19, 20));
    }

    #[test]
    fn test_randomized_workload_against_sorting_oracle() {
        let mut rng = SmallRng::seed_from_u64(0x5EED);
        let mut tracker = FreqRank::new();
        let mut oracle: Vec<(u32, u64)> = Vec::new(); // (key, count), insertion-ordered

        for _ in 0..5_000 {
            let key: u32 = rng.random_range(0..200);
            tracker.record(key);
            match oracle.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 += 1,
                None => oracle.push((key, 1)),
            }
        }
        tracker.debug_validate_invariants();

        // The oracle sorts by count only; compare multisets of counts per
        // rank position since arrival order inside the oracle differs.
        let mut by_count = oracle.clone();
        by_count.sort_by(|a, b| b.1.cmp(&a.1));
        let got = tracker.top_entries(50);
        assert_eq!(got.len(), 50);
        for (i, entry) in got.iter().enumerate() {
            assert_eq!(entry.count, by_count[i].1);
            assert_eq!(entry.count, tracker.count(&entry.key));
        }
    }

    #[test]
    fn test_default_is_empty() {
        let tracker: FreqRank<u64> = FreqRank::default();
        assert!(tracker.is_empty());
        assert_eq!(tracker.distinct_counts(), 0);
    }
}
