//! Frequency-bucketed entry store backing the LFU engine.
//!
//! Every resident entry carries an access frequency (`>= 1`). Entries with
//! the same frequency share a bucket, and each bucket is an intrusive list
//! whose front is the most recently touched entry. Buckets are chained in
//! ascending frequency order and `min_freq` names the first one, so the
//! eviction victim is always the back of the `min_freq` bucket.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>          entries: SlotArena<Entry<K, V>>
//!   ┌──────────┬────────┐                ┌────────┬──────────────────────────────┐
//!   │ "a"      │ id_0   │ ─────────────► │ id_0   │ key, value, freq=1, prev/next │
//!   │ "b"      │ id_1   │                │ id_1   │ key, value, freq=3, prev/next │
//!   │ "c"      │ id_2   │                │ id_2   │ key, value, freq=1, prev/next │
//!   └──────────┴────────┘                └────────┴──────────────────────────────┘
//!
//!   buckets: FxHashMap<u64, Bucket>   (linked ascending by frequency)
//!
//!   min_freq = 1
//!        │
//!        ▼
//!   ┌─────────┐  next   ┌─────────┐
//!   │ freq=1  │ ──────► │ freq=3  │
//!   │ c ◄─► a │ ◄────── │   b     │
//!   └─────────┘  prev   └─────────┘
//!    front  back (evicted first)
//! ```
//!
//! ## Operations
//!
//! | Operation    | Cost | Notes                                           |
//! |--------------|------|-------------------------------------------------|
//! | `insert`     | O(1) | new keys enter bucket 1 at the front            |
//! | `touch`      | O(1) | moves entry to the front of bucket `freq + 1`   |
//! | `remove`     | O(1) | empty buckets are unlinked eagerly              |
//! | `pop_min`    | O(1) | back of the `min_freq` bucket                   |
//! | `decay_by`   | O(n) | relinks every entry, keeps eviction order       |
//!
//! ## Invariants
//!
//! - a key is in `index` iff its entry is linked into exactly one bucket
//! - a bucket exists only while it is non-empty
//! - `min_freq` is the smallest bucket key, or 0 when empty

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::{InvariantError, ensure_invariant};

/// Buckets reserved up front. Most entries sit at low frequencies.
pub const DEFAULT_BUCKET_PREALLOC: usize = 32;

#[derive(Debug)]
struct Entry<K, V> {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    freq: u64,
    key: K,
    value: V,
}

#[derive(Debug, Default)]
struct Bucket {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    prev: Option<u64>,
    next: Option<u64>,
}

/// O(1) LFU store with least-recently-touched tie-breaking inside a frequency.
///
/// # Example
///
/// ```
/// use kcache::ds::FrequencyBuckets;
///
/// let mut buckets = FrequencyBuckets::new();
/// buckets.insert("a", 1);
/// buckets.insert("b", 2);
/// buckets.touch(&"a");
///
/// assert_eq!(buckets.frequency(&"a"), Some(2));
/// assert_eq!(buckets.min_freq(), Some(1));
/// assert_eq!(buckets.pop_min(), Some(("b", 2, 1)));
/// ```
#[derive(Debug)]
pub struct FrequencyBuckets<K, V> {
    entries: SlotArena<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    buckets: FxHashMap<u64, Bucket>,
    min_freq: u64,
}

impl<K, V> FrequencyBuckets<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut buckets = FxHashMap::default();
        buckets.reserve(DEFAULT_BUCKET_PREALLOC);
        let mut index = FxHashMap::default();
        index.reserve(capacity);
        Self {
            entries: SlotArena::with_capacity(capacity),
            index,
            buckets,
            min_freq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        Some(self.entries[id].freq)
    }

    /// Smallest resident frequency, `None` when empty.
    pub fn min_freq(&self) -> Option<u64> {
        (self.min_freq != 0).then_some(self.min_freq)
    }

    /// Number of non-empty buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Value for `key` without changing its frequency.
    pub fn get(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        Some(&self.entries[id].value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = *self.index.get(key)?;
        Some(&mut self.entries[id].value)
    }

    /// Inserts `key` at frequency 1.
    ///
    /// If the key is already present its value is replaced and the old one is
    /// returned; the frequency and bucket position are left alone.
    ///
    /// ```
    /// use kcache::ds::FrequencyBuckets;
    ///
    /// let mut buckets = FrequencyBuckets::new();
    /// assert_eq!(buckets.insert("k", 1), None);
    /// buckets.touch(&"k");
    /// assert_eq!(buckets.insert("k", 2), Some(1));
    /// assert_eq!(buckets.frequency(&"k"), Some(2));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[id].value, value));
        }

        let id = self.entries.insert(Entry {
            prev: None,
            next: None,
            freq: 1,
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);

        if !self.buckets.contains_key(&1) {
            let next = self.min_freq().filter(|&min| min > 1);
            self.insert_bucket(1, None, next);
        }
        self.list_push_front(1, id);
        self.min_freq = 1;
        None
    }

    /// Increments the frequency of `key` and returns the new value.
    ///
    /// The entry moves to the front of the next bucket. At `u64::MAX` the
    /// frequency saturates and the entry is only moved to its bucket front.
    pub fn touch(&mut self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        let current = self.entries[id].freq;
        if current == u64::MAX {
            self.list_remove(current, id);
            self.list_push_front(current, id);
            return Some(current);
        }
        let next_freq = current + 1;

        let (prev_existing, next_existing) = {
            let bucket = &self.buckets[&current];
            (bucket.prev, bucket.next)
        };

        self.list_remove(current, id);
        let emptied = self.bucket_is_empty(current);
        if emptied {
            self.remove_bucket(current, prev_existing, next_existing);
            if self.min_freq == current {
                self.min_freq = next_existing.unwrap_or(0);
            }
        }

        if !self.buckets.contains_key(&next_freq) {
            let prev = if emptied {
                prev_existing
            } else {
                Some(current)
            };
            self.insert_bucket(next_freq, prev, next_existing);
        }

        self.entries[id].freq = next_freq;
        self.list_push_front(next_freq, id);
        if self.min_freq == 0 || next_freq < self.min_freq {
            self.min_freq = next_freq;
        }
        Some(next_freq)
    }

    /// Removes `key`, returning its value and final frequency.
    pub fn remove(&mut self, key: &K) -> Option<(V, u64)> {
        let id = self.index.remove(key)?;
        let freq = self.entries[id].freq;
        self.unlink(freq, id);
        let entry = self.entries.remove(id)?;
        Some((entry.value, entry.freq))
    }

    /// Removes the least recently touched entry of the lowest frequency.
    pub fn pop_min(&mut self) -> Option<(K, V, u64)> {
        let freq = self.min_freq()?;
        let id = self.buckets.get(&freq)?.tail?;
        self.unlink(freq, id);
        let entry = self.entries.remove(id)?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value, entry.freq))
    }

    /// The entry `pop_min` would remove next.
    pub fn peek_min(&self) -> Option<(&K, &V, u64)> {
        let freq = self.min_freq()?;
        let id = self.buckets.get(&freq)?.tail?;
        let entry = &self.entries[id];
        Some((&entry.key, &entry.value, entry.freq))
    }

    /// Lowers every frequency by `amount`, never below 1.
    ///
    /// Entries are relinked coldest first, so two entries that land in the
    /// same bucket keep their relative eviction order. `min_freq` is
    /// recomputed from the bucket table afterwards.
    ///
    /// ```
    /// use kcache::ds::FrequencyBuckets;
    ///
    /// let mut buckets = FrequencyBuckets::new();
    /// buckets.insert("hot", ());
    /// buckets.insert("cold", ());
    /// for _ in 0..9 {
    ///     buckets.touch(&"hot");
    /// }
    ///
    /// buckets.decay_by(5);
    /// assert_eq!(buckets.frequency(&"hot"), Some(5));
    /// assert_eq!(buckets.frequency(&"cold"), Some(1));
    /// assert_eq!(buckets.min_freq(), Some(1));
    /// ```
    pub fn decay_by(&mut self, amount: u64) {
        if amount == 0 || self.is_empty() {
            return;
        }

        let order: Vec<SlotId> = self.eviction_order_ids().collect();
        self.buckets.clear();
        self.min_freq = 0;

        // Decayed frequencies are monotone in the old ones, so buckets are
        // created in ascending order and always appended after the last.
        let mut last: Option<u64> = None;
        for id in order {
            let freq = {
                let entry = &mut self.entries[id];
                entry.freq = entry.freq.saturating_sub(amount).max(1);
                entry.prev = None;
                entry.next = None;
                entry.freq
            };
            if last != Some(freq) {
                self.insert_bucket(freq, last, None);
                last = Some(freq);
            }
            self.list_push_front(freq, id);
        }

        self.min_freq = self.buckets.keys().copied().min().unwrap_or(0);
    }

    /// Sum of all resident frequencies.
    pub fn frequency_sum(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, (_, entry)| acc.saturating_add(entry.freq))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.buckets.clear();
        self.min_freq = 0;
    }

    /// Entries in arena order as `(key, value, frequency)`.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V, u64)> {
        self.entries
            .iter()
            .map(|(_, entry)| (&entry.key, &entry.value, entry.freq))
    }

    /// Keys in the order `pop_min` would return them.
    pub fn eviction_order(&self) -> impl Iterator<Item = (&K, u64)> {
        self.eviction_order_ids().map(|id| {
            let entry = &self.entries[id];
            (&entry.key, entry.freq)
        })
    }

    fn eviction_order_ids(&self) -> EvictionOrder<'_, K, V> {
        let freq = self.min_freq();
        EvictionOrder {
            buckets: self,
            freq,
            current: freq.and_then(|f| self.buckets.get(&f)).and_then(|b| b.tail),
        }
    }

    /// Full structural check: bucket chain, per-bucket links, index agreement.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        ensure_invariant!(
            self.index.len() == self.entries.len(),
            "index has {} keys, arena has {} entries",
            self.index.len(),
            self.entries.len()
        );

        if self.is_empty() {
            ensure_invariant!(self.buckets.is_empty(), "empty store has buckets");
            ensure_invariant!(self.min_freq == 0, "empty store has min_freq {}", self.min_freq);
            return Ok(());
        }

        let smallest = self.buckets.keys().copied().min().unwrap_or(0);
        ensure_invariant!(
            self.min_freq == smallest,
            "min_freq is {} but smallest bucket is {}",
            self.min_freq,
            smallest
        );

        let mut linked = 0usize;
        for (&freq, bucket) in &self.buckets {
            ensure_invariant!(bucket.head.is_some(), "bucket {} is empty", freq);
            match bucket.prev {
                Some(prev) => {
                    ensure_invariant!(prev < freq, "bucket {} links back to {}", freq, prev);
                    ensure_invariant!(
                        self.buckets.get(&prev).and_then(|b| b.next) == Some(freq),
                        "bucket {} has a broken prev link",
                        freq
                    );
                },
                None => ensure_invariant!(
                    freq == self.min_freq,
                    "bucket {} has no predecessor but min_freq is {}",
                    freq,
                    self.min_freq
                ),
            }
            if let Some(next) = bucket.next {
                ensure_invariant!(next > freq, "bucket {} links forward to {}", freq, next);
                ensure_invariant!(
                    self.buckets.get(&next).and_then(|b| b.prev) == Some(freq),
                    "bucket {} has a broken next link",
                    freq
                );
            }

            let mut last = None;
            let mut current = bucket.head;
            while let Some(id) = current {
                let Some(entry) = self.entries.get(id) else {
                    return Err(InvariantError::new(format!(
                        "bucket {} links to freed slot {}",
                        freq,
                        id.index()
                    )));
                };
                ensure_invariant!(entry.freq == freq, "entry in bucket {} has freq {}", freq, entry.freq);
                ensure_invariant!(entry.prev == last, "bucket {} has a broken entry link", freq);
                ensure_invariant!(
                    self.index.get(&entry.key) == Some(&id),
                    "entry in bucket {} is not indexed",
                    freq
                );
                linked += 1;
                ensure_invariant!(linked <= self.entries.len(), "bucket {} contains a cycle", freq);
                last = Some(id);
                current = entry.next;
            }
            ensure_invariant!(bucket.tail == last, "bucket {} tail is stale", freq);
        }

        ensure_invariant!(
            linked == self.entries.len(),
            "{} entries linked into buckets, {} allocated",
            linked,
            self.entries.len()
        );
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }

    /// Detaches `id` from bucket `freq` and drops the bucket if it emptied.
    fn unlink(&mut self, freq: u64, id: SlotId) {
        self.list_remove(freq, id);
        if self.bucket_is_empty(freq) {
            let (prev, next) = {
                let bucket = &self.buckets[&freq];
                (bucket.prev, bucket.next)
            };
            self.remove_bucket(freq, prev, next);
            if self.min_freq == freq {
                self.min_freq = next.unwrap_or(0);
            }
        }
    }

    fn bucket_is_empty(&self, freq: u64) -> bool {
        self.buckets
            .get(&freq)
            .is_none_or(|bucket| bucket.head.is_none())
    }

    fn insert_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        self.buckets.insert(
            freq,
            Bucket {
                head: None,
                tail: None,
                prev,
                next,
            },
        );
        if let Some(prev) = prev
            && let Some(bucket) = self.buckets.get_mut(&prev)
        {
            bucket.next = Some(freq);
        }
        if let Some(next) = next
            && let Some(bucket) = self.buckets.get_mut(&next)
        {
            bucket.prev = Some(freq);
        }
    }

    fn remove_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        if let Some(prev) = prev
            && let Some(bucket) = self.buckets.get_mut(&prev)
        {
            bucket.next = next;
        }
        if let Some(next) = next
            && let Some(bucket) = self.buckets.get_mut(&next)
        {
            bucket.prev = prev;
        }
        self.buckets.remove(&freq);
    }

    fn list_push_front(&mut self, freq: u64, id: SlotId) {
        let Some(bucket) = self.buckets.get_mut(&freq) else {
            return;
        };
        let old_head = bucket.head;
        match old_head {
            Some(old_head) => self.entries[old_head].prev = Some(id),
            None => bucket.tail = Some(id),
        }
        bucket.head = Some(id);

        let entry = &mut self.entries[id];
        entry.prev = None;
        entry.next = old_head;
    }

    fn list_remove(&mut self, freq: u64, id: SlotId) {
        let (prev, next) = {
            let entry = &self.entries[id];
            (entry.prev, entry.next)
        };
        let Some(bucket) = self.buckets.get_mut(&freq) else {
            return;
        };

        match prev {
            Some(prev) => self.entries[prev].next = next,
            None => bucket.head = next,
        }
        match next {
            Some(next) => self.entries[next].prev = prev,
            None => bucket.tail = prev,
        }

        let entry = &mut self.entries[id];
        entry.prev = None;
        entry.next = None;
    }
}

impl<K, V> Default for FrequencyBuckets<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Walks buckets in ascending frequency, each from back to front.
struct EvictionOrder<'a, K, V> {
    buckets: &'a FrequencyBuckets<K, V>,
    freq: Option<u64>,
    current: Option<SlotId>,
}

impl<K, V> Iterator for EvictionOrder<'_, K, V> {
    type Item = SlotId;

    fn next(&mut self) -> Option<SlotId> {
        loop {
            if let Some(id) = self.current {
                self.current = self.buckets.entries.get(id)?.prev;
                return Some(id);
            }
            let bucket = self.buckets.buckets.get(&self.freq?)?;
            self.freq = bucket.next;
            self.current = self
                .freq
                .and_then(|f| self.buckets.buckets.get(&f))
                .and_then(|b| b.tail);
            self.freq?;
        }
    }
}
