//! prime-hashmap: string-keyed hash maps over prime-sized tables, in two
//! collision-resolution flavors, plus a frequency-mode search built on one of
//! them.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: small, inspectable tables whose every slot position can be
//!   re-derived from the key, the injected hash function and the current
//!   capacity.
//! - Layers:
//!   - `prime`: `is_prime` / `next_prime`; every capacity passes through it.
//!   - `OpenAddressingMap<V, H>`: entries live in the slot array; quadratic
//!     probing on collision; removal leaves a tombstone that lookups probe
//!     through and insertions reuse.
//!   - `ChainingMap<V, H>`: each slot owns a singly linked `Chain`; removal
//!     unlinks the node.
//!   - `find_mode`: one pass over the input with a private `ChainingMap` as
//!     the frequency counter.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` (the hash-call guard carries a raw
//!   pointer marker).
//! - Capacity is always prime and never shrinks on removal.
//! - Load factor is enforced at `put` time, before insertion: open
//!   addressing grows once `len / capacity` reaches
//!   [`open_addressing::MAX_LOAD_FACTOR`] (1/2), chaining once it reaches
//!   [`chaining::MAX_LOAD_FACTOR`] (1/1). Growth targets
//!   `next_prime(2 * capacity)`.
//! - Nothing is cached per entry: no stored hashes, no stored positions.
//!
//! Hash functions
//! - Supplied by the caller as any `Fn(&str) -> u64` (or a [`KeyHasher`]
//!   impl). The table reduces the result modulo its capacity and never seeds
//!   or replaces it. [`sum_of_chars`] and [`weighted_sum_of_chars`] are
//!   provided as simple deterministic choices.
//!
//! Rehashing
//! - Resizes move surviving entries through a dedicated rehash-insert path
//!   that skips the load check, so a resize never triggers a nested resize.
//!   Instead, `resize_table` rounds a target that is too small for the live
//!   entries up by repeated doubling, so the rehashed table stays under its
//!   maximum load factor.
//!
//! Reentrancy policy
//! - The hash function is the only user code a table calls. Each call runs
//!   under a debug-only guard; a hash function that re-enters its own table
//!   panics in debug builds.
//!
//! Errors and absence
//! - Missing keys are reported through `Option`, never as errors. The only
//!   error is constructing a table with capacity 0 ([`TableError`]).
//!   Resize requests below the live count (open addressing) or below 1
//!   (chaining) are ignored.
//!
//! Logging
//! - Resizes log at `debug`, clears at `trace`, through the `log` facade.

mod chain;
pub mod chaining;
mod entry;
mod error;
mod hasher;
mod map_proptest;
mod mode;
pub mod open_addressing;
pub mod prime;
mod reentrancy;

// Public surface
pub use chaining::{ChainingMap, DEFAULT_CAPACITY};
pub use error::TableError;
pub use hasher::{sum_of_chars, weighted_sum_of_chars, HashFn, KeyHasher};
pub use mode::find_mode;
pub use open_addressing::OpenAddressingMap;
pub use prime::{is_prime, next_prime};
