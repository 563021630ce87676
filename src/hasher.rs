//! Hash function seam.
//!
//! Tables never pick a hash algorithm themselves: the caller injects a
//! deterministic `&str -> u64` function at construction and the table reduces
//! its output modulo the current capacity. Plain functions and closures work
//! through the blanket impl; stateful hashers can implement [`KeyHasher`].

/// A deterministic, total mapping from keys to non-negative integers.
pub trait KeyHasher {
    fn hash_key(&self, key: &str) -> u64;
}

impl<F> KeyHasher for F
where
    F: Fn(&str) -> u64,
{
    #[inline]
    fn hash_key(&self, key: &str) -> u64 {
        self(key)
    }
}

/// Default hasher type parameter for both tables.
pub type HashFn = fn(&str) -> u64;

/// Sum of the key's character code points.
pub fn sum_of_chars(key: &str) -> u64 {
    key.chars().map(u64::from).sum()
}

/// Sum of `(position + 1) * code point`; distinguishes anagrams.
pub fn weighted_sum_of_chars(key: &str) -> u64 {
    key.chars()
        .zip(1u64..)
        .map(|(c, weight)| weight * u64::from(c))
        .sum()
}
