#![cfg(test)]

// Property tests for both table variants kept inside the crate so they can
// reach crate-private helpers.

use crate::chaining::ChainingMap;
use crate::hasher::{weighted_sum_of_chars, KeyHasher};
use crate::open_addressing::OpenAddressingMap;
use crate::prime::is_prime;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeMap, BTreeSet, HashMap};

// Pool-indexed operations so shrinking moves toward earlier keys and shorter
// op lists.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Resize(usize),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            2 => idx.clone().prop_map(Op::Remove),
            1 => idx.clone().prop_map(Op::Get),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(Op::Contains),
            1 => (0usize..40).prop_map(Op::Resize),
            1 => Just(Op::Clear),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// The operations both variants share, so one state machine drives both.
trait Table {
    fn put(&mut self, key: String, value: i32) -> Option<i32>;
    fn get(&self, key: &str) -> Option<i32>;
    fn contains_key(&self, key: &str) -> bool;
    fn remove(&mut self, key: &str) -> Option<i32>;
    fn resize_table(&mut self, new_capacity: usize);
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn capacity(&self) -> usize;
    fn pairs(&self) -> Vec<(String, i32)>;
    /// Smallest resize request that is not ignored.
    fn min_resize(&self) -> usize;
    /// Load bound that must hold right after `put` returns.
    fn load_ok_after_put(&self) -> bool;
}

impl<H: KeyHasher> Table for OpenAddressingMap<i32, H> {
    fn put(&mut self, key: String, value: i32) -> Option<i32> {
        OpenAddressingMap::put(self, key, value)
    }
    fn get(&self, key: &str) -> Option<i32> {
        OpenAddressingMap::get(self, key).copied()
    }
    fn contains_key(&self, key: &str) -> bool {
        OpenAddressingMap::contains_key(self, key)
    }
    fn remove(&mut self, key: &str) -> Option<i32> {
        OpenAddressingMap::remove(self, key)
    }
    fn resize_table(&mut self, new_capacity: usize) {
        OpenAddressingMap::resize_table(self, new_capacity)
    }
    fn clear(&mut self) {
        OpenAddressingMap::clear(self)
    }
    fn len(&self) -> usize {
        OpenAddressingMap::len(self)
    }
    fn capacity(&self) -> usize {
        OpenAddressingMap::capacity(self)
    }
    fn pairs(&self) -> Vec<(String, i32)> {
        self.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }
    fn min_resize(&self) -> usize {
        OpenAddressingMap::len(self)
    }
    fn load_ok_after_put(&self) -> bool {
        // Checked before insertion, so the entry just added may tip it past 0.5.
        2 * (OpenAddressingMap::len(self) - 1) < OpenAddressingMap::capacity(self)
    }
}

impl<H: KeyHasher> Table for ChainingMap<i32, H> {
    fn put(&mut self, key: String, value: i32) -> Option<i32> {
        ChainingMap::put(self, key, value)
    }
    fn get(&self, key: &str) -> Option<i32> {
        ChainingMap::get(self, key).copied()
    }
    fn contains_key(&self, key: &str) -> bool {
        ChainingMap::contains_key(self, key)
    }
    fn remove(&mut self, key: &str) -> Option<i32> {
        ChainingMap::remove(self, key)
    }
    fn resize_table(&mut self, new_capacity: usize) {
        ChainingMap::resize_table(self, new_capacity)
    }
    fn clear(&mut self) {
        ChainingMap::clear(self)
    }
    fn len(&self) -> usize {
        ChainingMap::len(self)
    }
    fn capacity(&self) -> usize {
        ChainingMap::capacity(self)
    }
    fn pairs(&self) -> Vec<(String, i32)> {
        self.get_keys_and_values()
            .into_iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }
    fn min_resize(&self) -> usize {
        1
    }
    fn load_ok_after_put(&self) -> bool {
        ChainingMap::len(self) <= ChainingMap::capacity(self)
    }
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised after every op:
// - `put` returns the previous value exactly when the model had the key.
// - `get`/`contains_key`/`remove` agree with the model, including after
//   resizes, clears and tombstone reuse.
// - Iteration yields every live key exactly once and nothing else.
// - Capacity is prime and unchanged by remove/clear; the load bound holds
//   right after each put.
fn run_scenario<T: Table>(
    sut: &mut T,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();
    for op in ops {
        let cap_before = sut.capacity();
        match op {
            Op::Put(i, v) => {
                let k = pool[i].clone();
                let prev = sut.put(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v));
                prop_assert!(sut.load_ok_after_put(), "load bound violated after put");
            }
            Op::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k), model.remove(k));
                prop_assert_eq!(sut.capacity(), cap_before, "remove must not resize");
                prop_assert!(!sut.contains_key(k));
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k).copied());
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            Op::Resize(c) => {
                let ignored = c < sut.min_resize();
                sut.resize_table(c);
                if ignored {
                    prop_assert_eq!(sut.capacity(), cap_before);
                } else {
                    prop_assert!(sut.capacity() >= c);
                    prop_assert!(sut.capacity() >= sut.len(), "resize left fewer slots than entries");
                }
                for (k, v) in &model {
                    prop_assert_eq!(sut.get(k), Some(*v));
                }
            }
            Op::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), cap_before, "clear must keep capacity");
                prop_assert!(sut.pairs().is_empty());
            }
            Op::Iterate => {
                let pairs = sut.pairs();
                let keys: BTreeSet<&String> = pairs.iter().map(|(k, _)| k).collect();
                prop_assert_eq!(keys.len(), pairs.len(), "duplicate live key");
                let s: BTreeMap<String, i32> = pairs.into_iter().collect();
                let m: BTreeMap<String, i32> = model.clone().into_iter().collect();
                prop_assert_eq!(s, m);
            }
        }

        prop_assert!(is_prime(sut.capacity()));
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.pairs().len(), model.len());
    }
    Ok(())
}

fn const_hash(_: &str) -> u64 {
    0
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_open_addressing_state_machine((pool, ops) in arb_scenario(), cap in 1usize..20) {
        let mut sut = OpenAddressingMap::<i32, _>::with_capacity_and_hasher(cap, weighted_sum_of_chars).unwrap();
        run_scenario(&mut sut, &pool, ops)?;
    }

    #[test]
    fn prop_chaining_state_machine((pool, ops) in arb_scenario(), cap in 1usize..20) {
        let mut sut = ChainingMap::<i32, _>::with_capacity_and_hasher(cap, weighted_sum_of_chars).unwrap();
        run_scenario(&mut sut, &pool, ops)?;
    }
}

// Same state machine under worst-case collisions: every key hashes to 0, so
// open addressing walks the full quadratic sequence and chaining keeps one
// long chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_open_addressing_with_collisions((pool, ops) in arb_scenario(), cap in 1usize..20) {
        let mut sut = OpenAddressingMap::<i32, _>::with_capacity_and_hasher(cap, const_hash).unwrap();
        run_scenario(&mut sut, &pool, ops)?;
    }

    #[test]
    fn prop_chaining_with_collisions((pool, ops) in arb_scenario(), cap in 1usize..20) {
        let mut sut = ChainingMap::<i32, _>::with_capacity_and_hasher(cap, const_hash).unwrap();
        run_scenario(&mut sut, &pool, ops)?;
    }
}

// Property: chaining places every entry in bucket `hash mod capacity`, so
// per-bucket lengths match a recount from the key set.
proptest! {
    #[test]
    fn prop_chain_lengths_match_bucket_index(keys in proptest::collection::btree_set("[a-z]{1,6}", 0..60)) {
        let mut sut = ChainingMap::with_capacity_and_hasher(3, weighted_sum_of_chars).unwrap();
        for k in &keys {
            sut.put(k.clone(), 0u8);
        }
        let cap = sut.capacity();
        let mut expected = vec![0usize; cap];
        for k in &keys {
            expected[(weighted_sum_of_chars(k) % cap as u64) as usize] += 1;
        }
        prop_assert_eq!(sut.chain_lengths(), expected);
        prop_assert_eq!(sut.empty_buckets(), sut.chain_lengths().iter().filter(|&&n| n == 0).count());
    }
}
