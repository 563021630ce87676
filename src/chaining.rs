//! ChainingMap: a prime number of buckets, each a singly linked `Chain`.
//!
//! A key always lives in bucket `hash(key) mod capacity`. Chains are
//! unbounded, so the table grows only to keep the load factor below 1.0.

use crate::chain::Chain;
use crate::error::TableError;
use crate::hasher::{sum_of_chars, HashFn, KeyHasher};
use crate::prime::{next_prime, resolve_capacity};
use crate::reentrancy::HashCallGuard;
use core::fmt;

/// Bucket count used by [`ChainingMap::new`].
pub const DEFAULT_CAPACITY: usize = 11;

/// Load factor at which `put` grows the table, as `(numerator, denominator)`.
pub const MAX_LOAD_FACTOR: (usize, usize) = (1, 1);

pub struct ChainingMap<V, H = HashFn> {
    buckets: Vec<Chain<V>>,
    capacity: usize,
    size: usize,
    hasher: H,
    hash_guard: HashCallGuard,
}

impl<V> ChainingMap<V> {
    /// `DEFAULT_CAPACITY` buckets hashed with [`sum_of_chars`].
    pub fn new() -> Self {
        let capacity = next_prime(DEFAULT_CAPACITY);
        Self {
            buckets: empty_buckets(capacity),
            capacity,
            size: 0,
            hasher: sum_of_chars,
            hash_guard: HashCallGuard::new(),
        }
    }
}

impl<V> Default for ChainingMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, H> ChainingMap<V, H>
where
    H: KeyHasher,
{
    /// Create a table with `next_prime(capacity)` buckets.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: H) -> Result<Self, TableError> {
        if capacity == 0 {
            return Err(TableError::ZeroCapacity);
        }
        let capacity = next_prime(capacity);
        Ok(Self {
            buckets: empty_buckets(capacity),
            capacity,
            size: 0,
            hasher,
            hash_guard: HashCallGuard::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    fn bucket_index(&self, key: &str) -> usize {
        let hash = self.hash_guard.hash(&self.hasher, key);
        (hash % self.capacity as u64) as usize
    }

    /// Insert or update `key`, growing to `next_prime(2 * capacity)` first
    /// once the load factor has reached 1.0. Returns the previous value on
    /// update.
    pub fn put(&mut self, key: String, value: V) -> Option<V> {
        if at_max_load(self.size, self.capacity) {
            self.resize_table(2 * self.capacity);
        }
        let idx = self.bucket_index(&key);
        let chain = &mut self.buckets[idx];
        if let Some(slot) = chain.get_mut(&key) {
            return Some(core::mem::replace(slot, value));
        }
        chain.insert(key, value);
        self.size += 1;
        None
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        if self.size == 0 {
            return None;
        }
        self.buckets[self.bucket_index(key)].get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        if self.size == 0 {
            return None;
        }
        let idx = self.bucket_index(key);
        let removed = self.buckets[idx].remove(key)?;
        self.size -= 1;
        Some(removed)
    }

    /// Rehash every entry into `new_capacity` buckets, rounded up to a prime.
    /// Ignored when `new_capacity` is 0.
    ///
    /// A target below `len()` keeps doubling until every entry fits without
    /// passing the maximum load factor.
    pub fn resize_table(&mut self, new_capacity: usize) {
        if new_capacity < 1 {
            return;
        }
        let mut capacity = resolve_capacity(new_capacity);
        while self.size > capacity {
            capacity = next_prime(2 * capacity);
        }
        log::debug!(
            "chaining resize: {} -> {} buckets, {} entries",
            self.capacity,
            capacity,
            self.size
        );

        let old = core::mem::replace(&mut self.buckets, empty_buckets(capacity));
        self.capacity = capacity;
        self.size = 0;
        // Chains are unbounded, so rehashing never needs the load check.
        for entry in old.into_iter().flatten() {
            let idx = self.bucket_index(&entry.key);
            self.buckets[idx].insert(entry.key, entry.value);
            self.size += 1;
        }
    }

    pub fn table_load(&self) -> f64 {
        self.size as f64 / self.capacity as f64
    }

    /// Number of buckets whose chain holds no entries.
    pub fn empty_buckets(&self) -> usize {
        self.buckets.iter().filter(|c| c.is_empty()).count()
    }

    /// Replace every chain with an empty one; capacity is unchanged.
    pub fn clear(&mut self) {
        log::trace!("chaining clear: {} entries", self.size);
        self.buckets = empty_buckets(self.capacity);
        self.size = 0;
    }

    /// `(key, value)` pairs in bucket order, then chain order.
    pub fn get_keys_and_values(&self) -> Vec<(&str, &V)> {
        self.buckets.iter().flat_map(|c| c.iter()).collect()
    }

    #[cfg(test)]
    pub(crate) fn chain_lengths(&self) -> Vec<usize> {
        self.buckets.iter().map(|c| c.len()).collect()
    }
}

fn at_max_load(size: usize, capacity: usize) -> bool {
    let (num, den) = MAX_LOAD_FACTOR;
    size * den >= capacity * num
}

fn empty_buckets<V>(capacity: usize) -> Vec<Chain<V>> {
    core::iter::repeat_with(Chain::new).take(capacity).collect()
}

impl<V, H> fmt::Debug for ChainingMap<V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainingMap")
            .field("capacity", &self.capacity)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
