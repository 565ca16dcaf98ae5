use std::collections::HashMap;
use std::hash::Hash;
use ahash::RandomState;

/// Member of a count bucket, stored in a slab and threaded into a doubly
/// linked FIFO list per bucket.
struct Member<T> {
    key: T,
    prev: Option<usize>,
    next: Option<usize>,
}

/// One populated count: a non-empty FIFO list of members plus the links to
/// the neighbouring populated counts (the frontier thread).
struct Bucket {
    head: Option<usize>, // earliest arrival at this count
    tail: Option<usize>, // latest arrival
    above: Option<u64>,  // next larger populated count
    below: Option<u64>,  // next smaller populated count
}

/// Groups keys by their current count and keeps the populated counts linked
/// in order, so the highest buckets can be walked without sorting.
///
/// A bucket exists iff it is non-empty; the `above`/`below` links plus the
/// cached `min_count`/`max_count` endpoints *are* the frontier. A key moving
/// from count `c` to `c + 1` touches at most two buckets.
///
/// Within a bucket, members are kept in the order they reached that count
/// (head = earliest). This is the tie-break order for ranked iteration.
pub(crate) struct BucketChain<T> {
    index: HashMap<T, usize, RandomState>, // key -> slot in members
    members: Vec<Member<T>>,               // slots are never freed: keys only climb
    buckets: HashMap<u64, Bucket, RandomState>,
    max_count: u64, // 0 when empty
    min_count: u64, // 0 when empty
}

impl<T: Hash + Eq + Clone> BucketChain<T> {
    pub(crate) fn with_capacity_and_hasher(capacity: usize, hasher: RandomState) -> Self {
        Self {
            index: HashMap::with_capacity_and_hasher(capacity, hasher),
            members: Vec::with_capacity(capacity),
            buckets: HashMap::default(),
            max_count: 0,
            min_count: 0,
        }
    }

    pub(crate) fn new() -> Self {
        Self::with_capacity_and_hasher(0, RandomState::new())
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of distinct populated counts.
    pub(crate) fn distinct_counts(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn max_count(&self) -> Option<u64> {
        (self.max_count != 0).then_some(self.max_count)
    }

    pub(crate) fn min_count(&self) -> Option<u64> {
        (self.min_count != 0).then_some(self.min_count)
    }

    /// Adds a key that is not currently tracked, at `count`.
    ///
    /// Panics if the key is already present; the caller owns the key -> count
    /// map and only routes unseen keys here.
    pub(crate) fn insert(&mut self, key: T, count: u64) {
        debug_assert!(count > 0);
        let slot = self.members.len();
        self.members.push(Member {
            key: key.clone(),
            prev: None,
            next: None,
        });
        let replaced = self.index.insert(key, slot);
        assert!(replaced.is_none(), "key inserted into bucket chain twice");

        self.ensure_bucket(count);
        self.list_push_back(count, slot);
    }

    /// Moves a tracked key from bucket `old` to bucket `new` (`new > old`),
    /// collapsing `old` if it empties and creating `new` if absent.
    ///
    /// The common `new == old + 1` transition is O(1); a larger jump walks
    /// the frontier upward from `old` to find the insertion point.
    pub(crate) fn promote(&mut self, key: &T, old: u64, new: u64) {
        debug_assert!(new > old);
        let slot = *self
            .index
            .get(key)
            .expect("promoted key missing from bucket chain");

        self.list_remove(old, slot);
        let (old_above, old_below, survives) = {
            let bucket = self.buckets.get(&old).expect("source bucket missing");
            (bucket.above, bucket.below, bucket.head.is_some())
        };
        if !survives {
            self.unlink_bucket(old);
        }

        if !self.buckets.contains_key(&new) {
            // Walk upward from just above `old`; `above` can never equal
            // `new` here because `new` has no bucket yet.
            let mut below = if survives { Some(old) } else { old_below };
            let mut above = old_above;
            while let Some(x) = above {
                if x > new {
                    break;
                }
                below = Some(x);
                above = self.buckets[&x].above;
            }
            self.link_bucket(new, below, above);
        }
        self.list_push_back(new, slot);
    }

    /// Descending iterator over `(key, count)`: highest count first, FIFO
    /// arrival order within a count.
    pub(crate) fn iter(&self) -> RankedIter<'_, T> {
        let count = self.max_count();
        let slot = count.and_then(|c| self.buckets[&c].head);
        RankedIter {
            chain: self,
            count,
            slot,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.index.clear();
        self.members.clear();
        self.buckets.clear();
        self.max_count = 0;
        self.min_count = 0;
    }

    /// Creates the bucket for `count` if absent and links it into place.
    ///
    /// O(1) when `count` lands outside the current [min, max] range (the
    /// only case `insert` hits in steady state, since unseen keys enter at
    /// the bottom); otherwise walks the frontier upward from the minimum.
    fn ensure_bucket(&mut self, count: u64) {
        if self.buckets.contains_key(&count) {
            return;
        }
        if self.max_count == 0 {
            self.link_bucket(count, None, None);
        } else if count < self.min_count {
            self.link_bucket(count, None, Some(self.min_count));
        } else if count > self.max_count {
            self.link_bucket(count, Some(self.max_count), None);
        } else {
            let mut below = self.min_count;
            loop {
                let above = self.buckets[&below]
                    .above
                    .expect("frontier walk ran past the maximum");
                if above > count {
                    self.link_bucket(count, Some(below), Some(above));
                    return;
                }
                below = above;
            }
        }
    }

    fn link_bucket(&mut self, count: u64, below: Option<u64>, above: Option<u64>) {
        self.buckets.insert(
            count,
            Bucket {
                head: None,
                tail: None,
                above,
                below,
            },
        );
        if let Some(b) = below {
            self.buckets
                .get_mut(&b)
                .expect("below neighbour missing")
                .above = Some(count);
        }
        if let Some(a) = above {
            self.buckets
                .get_mut(&a)
                .expect("above neighbour missing")
                .below = Some(count);
        }
        if self.min_count == 0 || count < self.min_count {
            self.min_count = count;
        }
        if count > self.max_count {
            self.max_count = count;
        }
    }

    fn unlink_bucket(&mut self, count: u64) {
        let bucket = self.buckets.remove(&count).expect("unlinked bucket missing");
        debug_assert!(bucket.head.is_none() && bucket.tail.is_none());
        if let Some(b) = bucket.below {
            self.buckets
                .get_mut(&b)
                .expect("below neighbour missing")
                .above = bucket.above;
        }
        if let Some(a) = bucket.above {
            self.buckets
                .get_mut(&a)
                .expect("above neighbour missing")
                .below = bucket.below;
        }
        if self.min_count == count {
            self.min_count = bucket.above.unwrap_or(0);
        }
        if self.max_count == count {
            self.max_count = bucket.below.unwrap_or(0);
        }
    }

    fn list_push_back(&mut self, count: u64, slot: usize) {
        let bucket = self
            .buckets
            .get_mut(&count)
            .expect("push into missing bucket");
        let old_tail = bucket.tail;
        self.members[slot].prev = old_tail;
        self.members[slot].next = None;
        match old_tail {
            Some(tail) => self.members[tail].next = Some(slot),
            None => bucket.head = Some(slot),
        }
        bucket.tail = Some(slot);
    }

    fn list_remove(&mut self, count: u64, slot: usize) {
        let (prev, next) = {
            let member = &self.members[slot];
            (member.prev, member.next)
        };
        let bucket = self
            .buckets
            .get_mut(&count)
            .expect("remove from missing bucket");
        match prev {
            Some(p) => self.members[p].next = next,
            None => bucket.head = next,
        }
        match next {
            Some(n) => self.members[n].prev = prev,
            None => bucket.tail = prev,
        }
        self.members[slot].prev = None;
        self.members[slot].next = None;
    }

    /// Walks the whole structure and asserts every internal invariant:
    /// no empty bucket lingers, the frontier links are a strictly
    /// descending chain between the cached endpoints, every member list is
    /// consistent with the index, and every bucket is reachable.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn validate(&self) {
        assert_eq!(self.index.len(), self.members.len());
        if self.index.is_empty() {
            assert!(self.buckets.is_empty());
            assert_eq!(self.min_count, 0);
            assert_eq!(self.max_count, 0);
            return;
        }
        assert!(self.buckets.contains_key(&self.min_count));
        assert!(self.buckets.contains_key(&self.max_count));

        let mut seen_members = 0usize;
        let mut seen_buckets = 0usize;
        let mut cursor = Some(self.max_count);
        let mut count_above: Option<u64> = None;
        while let Some(count) = cursor {
            let bucket = &self.buckets[&count];
            seen_buckets += 1;
            assert_eq!(bucket.above, count_above);
            if let Some(a) = count_above {
                assert!(a > count, "frontier thread not descending");
            }

            assert!(bucket.head.is_some(), "empty bucket left in chain");
            let mut slot = bucket.head;
            let mut last = None;
            while let Some(s) = slot {
                let member = &self.members[s];
                assert_eq!(member.prev, last);
                assert_eq!(self.index.get(&member.key), Some(&s));
                seen_members += 1;
                last = Some(s);
                slot = member.next;
            }
            assert_eq!(bucket.tail, last);

            if bucket.below.is_none() {
                assert_eq!(count, self.min_count);
            }
            count_above = Some(count);
            cursor = bucket.below;
        }
        assert_eq!(seen_members, self.index.len());
        assert_eq!(seen_buckets, self.buckets.len());
    }
}

pub(crate) struct RankedIter<'a, T> {
    chain: &'a BucketChain<T>,
    count: Option<u64>,
    slot: Option<usize>,
}

impl<'a, T> Iterator for RankedIter<'a, T> {
    type Item = (&'a T, u64);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let count = self.count?;
            if let Some(slot) = self.slot {
                let member = &self.chain.members[slot];
                self.slot = member.next;
                return Some((&member.key, count));
            }
            // Buckets are never empty, so stepping down always yields a head.
            self.count = self.chain.buckets[&count].below;
            self.slot = self.count.and_then(|c| self.chain.buckets[&c].head);
        }
    }
}
