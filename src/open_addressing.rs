//! OpenAddressingMap: entries stored directly in a prime-sized slot array,
//! collisions resolved by quadratic probing, removals marked by tombstones.
//!
//! Slot positions are never cached: every probe re-derives the sequence
//! `(hash(key) + i*i) mod capacity` from the key and the current capacity.
//! Tombstones keep their key so a lookup can stop at the removed key, and
//! are only reclaimed by insertion into them or by a resize.

use crate::entry::Entry;
use crate::error::TableError;
use crate::hasher::{HashFn, KeyHasher};
use crate::prime::{next_prime, resolve_capacity};
use crate::reentrancy::HashCallGuard;
use core::fmt;

#[derive(Debug)]
enum Slot<V> {
    Empty,
    Tombstone(String),
    Occupied(Entry<V>),
}

/// Quadratic probe positions `h, h+1, h+4, h+9, ...` modulo `capacity`,
/// bounded to `capacity` steps.
struct QuadraticProbe {
    pos: usize,
    step: usize,
    capacity: usize,
}

impl QuadraticProbe {
    fn new(hash: u64, capacity: usize) -> Self {
        Self {
            pos: (hash % capacity as u64) as usize,
            step: 0,
            capacity,
        }
    }
}

impl Iterator for QuadraticProbe {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.step >= self.capacity {
            return None;
        }
        let current = self.pos;
        // (i+1)^2 - i^2 = 2i + 1
        self.pos = (self.pos + 2 * self.step + 1) % self.capacity;
        self.step += 1;
        Some(current)
    }
}

/// Where an insertion probe ended.
enum InsertSlot {
    /// Live slot already holding the key.
    Existing(usize),
    /// Empty or tombstoned slot to write a new entry into.
    Vacant(usize),
}

/// Load factor at which `put` grows the table, as `(numerator, denominator)`.
pub const MAX_LOAD_FACTOR: (usize, usize) = (1, 2);

pub struct OpenAddressingMap<V, H = HashFn> {
    slots: Vec<Slot<V>>,
    capacity: usize,
    size: usize,
    hasher: H,
    hash_guard: HashCallGuard,
}

impl<V, H> OpenAddressingMap<V, H>
where
    H: KeyHasher,
{
    /// Create a table whose capacity is `next_prime(capacity)`.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: H) -> Result<Self, TableError> {
        if capacity == 0 {
            return Err(TableError::ZeroCapacity);
        }
        let capacity = next_prime(capacity);
        Ok(Self {
            slots: empty_slots(capacity),
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

    fn hash(&self, key: &str) -> u64 {
        self.hash_guard.hash(&self.hasher, key)
    }

    /// Lookup probe: passes over tombstones of other keys, stops at an empty
    /// slot or at the first slot carrying `key`.
    fn find_live(&self, key: &str) -> Option<usize> {
        if self.size == 0 {
            return None;
        }
        for idx in QuadraticProbe::new(self.hash(key), self.capacity) {
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Occupied(e) if e.key == key => return Some(idx),
                Slot::Tombstone(k) if k == key => return None,
                _ => {}
            }
        }
        None
    }

    /// Insertion probe: the first tombstone on the path is reused unless the
    /// key is still live further along, so a key is never stored twice.
    fn find_insert_slot(&self, key: &str) -> InsertSlot {
        let mut reusable: Option<usize> = None;
        for idx in QuadraticProbe::new(self.hash(key), self.capacity) {
            match &self.slots[idx] {
                Slot::Empty => return InsertSlot::Vacant(reusable.unwrap_or(idx)),
                Slot::Occupied(e) if e.key == key => return InsertSlot::Existing(idx),
                Slot::Tombstone(_) => {
                    reusable.get_or_insert(idx);
                }
                Slot::Occupied(_) => {}
            }
        }
        InsertSlot::Vacant(
            reusable.expect("quadratic probe must reach a free slot while load factor < 0.5"),
        )
    }

    /// Insert or update `key`. Grows to `next_prime(2 * capacity)` first when
    /// the load factor has reached 0.5. Returns the previous value on update.
    pub fn put(&mut self, key: String, value: V) -> Option<V> {
        if at_max_load(self.size, self.capacity) {
            self.resize_table(2 * self.capacity);
        }
        match self.find_insert_slot(&key) {
            InsertSlot::Existing(idx) => match &mut self.slots[idx] {
                Slot::Occupied(e) => Some(core::mem::replace(&mut e.value, value)),
                _ => unreachable!("insert probe reported a live slot"),
            },
            InsertSlot::Vacant(idx) => {
                self.slots[idx] = Slot::Occupied(Entry::new(key, value));
                self.size += 1;
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let idx = self.find_live(key)?;
        match &self.slots[idx] {
            Slot::Occupied(e) => Some(&e.value),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find_live(key).is_some()
    }

    /// Tombstone `key`'s slot and return its value; no-op when absent.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.find_live(key)?;
        let slot = core::mem::replace(&mut self.slots[idx], Slot::Empty);
        match slot {
            Slot::Occupied(e) => {
                self.slots[idx] = Slot::Tombstone(e.key);
                self.size -= 1;
                Some(e.value)
            }
            other => {
                self.slots[idx] = other;
                None
            }
        }
    }

    /// Rehash every live entry into fresh storage of a prime capacity at or
    /// above `new_capacity`. Ignored when `new_capacity` is below `len()`.
    ///
    /// If the requested capacity would leave the rehashed table at or over
    /// half full, it keeps doubling so quadratic probing is guaranteed to
    /// place every entry.
    pub fn resize_table(&mut self, new_capacity: usize) {
        if new_capacity < self.size {
            return;
        }
        let mut capacity = resolve_capacity(new_capacity);
        while self.size > 0 && at_max_load(self.size - 1, capacity) {
            capacity = next_prime(2 * capacity);
        }
        log::debug!(
            "open addressing resize: {} -> {} slots, {} live entries",
            self.capacity,
            capacity,
            self.size
        );

        let old = core::mem::replace(&mut self.slots, empty_slots(capacity));
        self.capacity = capacity;
        self.size = 0;
        for slot in old {
            if let Slot::Occupied(entry) = slot {
                self.rehash_insert(entry);
            }
        }
    }

    // Resize already sized the table; skip the load check.
    fn rehash_insert(&mut self, entry: Entry<V>) {
        let idx = match self.find_insert_slot(&entry.key) {
            InsertSlot::Vacant(idx) | InsertSlot::Existing(idx) => idx,
        };
        self.slots[idx] = Slot::Occupied(entry);
        self.size += 1;
    }

    pub fn table_load(&self) -> f64 {
        self.size as f64 / self.capacity as f64
    }

    /// Slots not holding a live entry; tombstones count as empty.
    pub fn empty_buckets(&self) -> usize {
        self.capacity - self.size
    }

    /// Drop every entry and tombstone; capacity is unchanged.
    pub fn clear(&mut self) {
        log::trace!("open addressing clear: {} live entries", self.size);
        self.slots = empty_slots(self.capacity);
        self.size = 0;
    }

    /// Live `(key, value)` pairs in slot order.
    pub fn get_keys_and_values(&self) -> Vec<(&str, &V)> {
        self.iter().collect()
    }

    /// Live entries in increasing slot order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            it: self.slots.iter(),
        }
    }
}

fn at_max_load(size: usize, capacity: usize) -> bool {
    let (num, den) = MAX_LOAD_FACTOR;
    size * den >= capacity * num
}

fn empty_slots<V>(capacity: usize) -> Vec<Slot<V>> {
    core::iter::repeat_with(|| Slot::Empty).take(capacity).collect()
}

impl<V, H> fmt::Debug for OpenAddressingMap<V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAddressingMap")
            .field("capacity", &self.capacity)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Iterator over live entries of an `OpenAddressingMap`.
pub struct Iter<'a, V> {
    it: core::slice::Iter<'a, Slot<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.find_map(|slot| match slot {
            Slot::Occupied(e) => Some(e.as_pair()),
            _ => None,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.it.size_hint().1)
    }
}

impl<'a, V, H> IntoIterator for &'a OpenAddressingMap<V, H>
where
    H: KeyHasher,
{
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::sum_of_chars;
    use crate::prime::is_prime;
    use std::collections::BTreeSet;

    fn const_hash(_: &str) -> u64 {
        0
    }

    fn letter_hash(key: &str) -> u64 {
        key.bytes().next().map(|b| u64::from(b - b'a')).unwrap_or(0)
    }

    fn slot_keys<V, H>(m: &OpenAddressingMap<V, H>) -> Vec<Option<&str>> {
        m.slots
            .iter()
            .map(|s| match s {
                Slot::Occupied(e) => Some(e.key.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn grows_exactly_at_max_load_factor() {
        let (num, den) = MAX_LOAD_FACTOR;
        let mut m = OpenAddressingMap::with_capacity_and_hasher(11, sum_of_chars).unwrap();
        for i in 0..40 {
            let (len, cap) = (m.len(), m.capacity());
            m.put(format!("k{}", i), i);
            assert_eq!(m.capacity() != cap, len * den >= cap * num);
        }
    }

    #[test]
    fn zero_capacity_rejected() {
        let r: Result<OpenAddressingMap<i32, _>, _> =
            OpenAddressingMap::with_capacity_and_hasher(0, sum_of_chars);
        assert_eq!(r.err(), Some(TableError::ZeroCapacity));
    }

    /// Construction applies `next_prime`, including the even bump.
    #[test]
    fn construction_rounds_to_prime() {
        let m: OpenAddressingMap<i32, _> = OpenAddressingMap::with_capacity_and_hasher(11, sum_of_chars).unwrap();
        assert_eq!(m.capacity(), 11);
        let m: OpenAddressingMap<i32, _> = OpenAddressingMap::with_capacity_and_hasher(2, sum_of_chars).unwrap();
        assert_eq!(m.capacity(), 3);
        let m: OpenAddressingMap<i32, _> = OpenAddressingMap::with_capacity_and_hasher(20, sum_of_chars).unwrap();
        assert_eq!(m.capacity(), 23);
    }

    #[test]
    fn probe_offsets_are_squares() {
        let seq: Vec<usize> = QuadraticProbe::new(3, 11).take(5).collect();
        assert_eq!(seq, vec![3, 4, 7, 1, 8]);
        assert_eq!(QuadraticProbe::new(0, 7).count(), 7);
    }

    /// Colliding keys land at home, home+1, home+4 in insertion order.
    #[test]
    fn collisions_follow_quadratic_offsets() {
        let mut m = OpenAddressingMap::with_capacity_and_hasher(11, const_hash).unwrap();
        m.put("a".to_string(), 1);
        m.put("b".to_string(), 2);
        m.put("c".to_string(), 3);
        let keys = slot_keys(&m);
        assert_eq!(keys[0], Some("a"));
        assert_eq!(keys[1], Some("b"));
        assert_eq!(keys[4], Some("c"));
        assert_eq!(m.get("c"), Some(&3));
    }

    /// Lookup probes through tombstones of other keys.
    #[test]
    fn lookup_passes_foreign_tombstones() {
        let mut m = OpenAddressingMap::with_capacity_and_hasher(11, const_hash).unwrap();
        m.put("a".to_string(), 1);
        m.put("b".to_string(), 2);
        m.put("c".to_string(), 3);
        assert_eq!(m.remove("b"), Some(2));
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("c"), Some(&3));
        assert!(!m.contains_key("b"));
    }

    /// Re-putting a removed key reuses its tombstone and counts once.
    #[test]
    fn tombstone_reused_for_same_key() {
        let mut m = OpenAddressingMap::with_capacity_and_hasher(11, const_hash).unwrap();
        m.put("a".to_string(), 1);
        m.put("b".to_string(), 2);
        m.remove("a");
        assert_eq!(m.put("a".to_string(), 9), None);
        assert_eq!(m.len(), 2);
        assert_eq!(slot_keys(&m)[0], Some("a"));
        assert_eq!(m.get("a"), Some(&9));
    }

    /// A key live past a foreign tombstone is updated in place, not duplicated.
    #[test]
    fn live_key_past_tombstone_is_updated() {
        let mut m = OpenAddressingMap::with_capacity_and_hasher(11, const_hash).unwrap();
        m.put("a".to_string(), 1);
        m.put("b".to_string(), 2);
        m.remove("a");
        assert_eq!(m.put("b".to_string(), 3), Some(2));
        assert_eq!(m.len(), 1);
        let live: Vec<_> = m.iter().collect();
        assert_eq!(live, vec![("b", &3)]);
    }

    /// A table whose free slots are all tombstones still terminates lookups and inserts.
    #[test]
    fn saturated_tombstones_terminate() {
        let mut m = OpenAddressingMap::with_capacity_and_hasher(5, letter_hash).unwrap();
        for round in 0..10 {
            for k in ["a", "b", "c", "d", "e"] {
                m.put(format!("{}{}", k, round), round);
                m.remove(&format!("{}{}", k, round));
            }
        }
        assert!(m.is_empty());
        assert!(m.slots.iter().all(|s| matches!(s, Slot::Tombstone(_))));
        m.put("a".to_string(), 1);
        assert_eq!(m.get("a"), Some(&1));
        assert_eq!(m.get("zz"), None);
        assert_eq!(m.remove("zz"), None);
    }

    #[test]
    fn growth_happens_before_half_full_insert() {
        let mut m = OpenAddressingMap::with_capacity_and_hasher(11, letter_hash).unwrap();
        for (i, k) in ["a", "b", "c", "d", "e", "f"].iter().enumerate() {
            m.put((*k).to_string(), i);
            assert_eq!(m.capacity(), 11);
        }
        m.put("g".to_string(), 6);
        assert_eq!(m.capacity(), 23);
        assert_eq!(m.len(), 7);
    }

    #[test]
    fn resize_below_len_is_ignored() {
        let mut m = OpenAddressingMap::with_capacity_and_hasher(11, sum_of_chars).unwrap();
        for k in ["x", "y", "z"] {
            m.put(k.to_string(), 0);
        }
        m.resize_table(2);
        assert_eq!(m.capacity(), 11);
        assert_eq!(m.len(), 3);
    }

    /// Rehash drops tombstones and keeps prime capacity.
    #[test]
    fn resize_reclaims_tombstones() {
        let mut m = OpenAddressingMap::with_capacity_and_hasher(11, const_hash).unwrap();
        m.put("a".to_string(), 1);
        m.put("b".to_string(), 2);
        m.remove("a");
        m.resize_table(11);
        assert!(m.slots.iter().all(|s| !matches!(s, Slot::Tombstone(_))));
        assert_eq!(slot_keys(&m)[0], Some("b"));
        assert_eq!(m.get("b"), Some(&2));
    }

    /// A tight resize target keeps doubling until every entry fits.
    #[test]
    fn tight_resize_grows_until_entries_fit() {
        let mut m = OpenAddressingMap::with_capacity_and_hasher(23, const_hash).unwrap();
        let keys = ["a", "b", "c", "d", "e", "f", "g"];
        for (i, k) in keys.iter().enumerate() {
            m.put((*k).to_string(), i);
        }
        m.resize_table(7);
        assert!(is_prime(m.capacity()));
        assert!(2 * (m.len() - 1) < m.capacity());
        assert_eq!(m.capacity(), 17);
        for (i, k) in keys.iter().enumerate() {
            assert_eq!(m.get(k), Some(&i));
        }
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut m = OpenAddressingMap::with_capacity_and_hasher(7, sum_of_chars).unwrap();
        m.put("a".to_string(), 1);
        m.put("b".to_string(), 2);
        m.remove("a");
        m.clear();
        assert_eq!(m.capacity(), 7);
        assert_eq!(m.len(), 0);
        assert_eq!(m.table_load(), 0.0);
        assert_eq!(m.empty_buckets(), 7);
        assert!(m.slots.iter().all(|s| matches!(s, Slot::Empty)));
    }

    /// Iteration yields each live entry once, in slot order, skipping tombstones.
    #[test]
    fn iteration_in_slot_order() {
        let mut m = OpenAddressingMap::with_capacity_and_hasher(11, letter_hash).unwrap();
        for k in ["d", "a", "c", "b"] {
            m.put(k.to_string(), k.to_uppercase());
        }
        m.remove("c");
        let keys: Vec<&str> = m.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "d"]);
        let set: BTreeSet<&str> = (&m).into_iter().map(|(k, _)| k).collect();
        assert_eq!(set.len(), 3);
        assert_eq!(m.get_keys_and_values()[0], ("a", &"A".to_string()));
    }

    /// Re-acquiring an iterator restarts from the first slot.
    #[test]
    fn iterators_are_single_pass() {
        let mut m = OpenAddressingMap::with_capacity_and_hasher(11, letter_hash).unwrap();
        m.put("a".to_string(), 1);
        let mut it = m.iter();
        assert!(it.next().is_some());
        assert!(it.next().is_none());
        assert_eq!(m.iter().count(), 1);
    }

    #[test]
    fn debug_shows_shape_only() {
        let m: OpenAddressingMap<i32, _> = OpenAddressingMap::with_capacity_and_hasher(5, sum_of_chars).unwrap();
        let s = format!("{:?}", m);
        assert!(s.contains("capacity: 5"));
        assert!(s.contains("size: 0"));
    }
}
