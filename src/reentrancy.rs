//! Debug-only check that a table's hash function does not call back into the
//! table it is hashing for.
//!
//! Hashing is the one place a table hands control to caller code, and it does
//! so in the middle of a probe or a rehash. Every hash call goes through
//! [`HashCallGuard::hash`], which marks the table busy until the hash function
//! returns or unwinds. A hash function that reaches the same table while it is
//! busy panics in debug builds. Release builds keep only the call.

use crate::hasher::KeyHasher;
#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct HashCallGuard {
    #[cfg(debug_assertions)]
    hashing: Cell<bool>,
    // Tables are single-threaded: keep them !Send + !Sync.
    _single_thread: PhantomData<*mut ()>,
}

impl HashCallGuard {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            hashing: Cell::new(false),
            _single_thread: PhantomData,
        }
    }

    /// Hash `key` with `hasher` while the table is marked busy.
    #[inline]
    pub(crate) fn hash<H: KeyHasher + ?Sized>(&self, hasher: &H, key: &str) -> u64 {
        let _busy = self.mark_busy();
        hasher.hash_key(key)
    }

    #[inline]
    fn mark_busy(&self) -> Busy<'_> {
        #[cfg(debug_assertions)]
        let busy = {
            let already = self.hashing.replace(true);
            assert!(!already, "hash function re-entered the table it is hashing for");
            Busy {
                hashing: &self.hashing,
            }
        };
        #[cfg(not(debug_assertions))]
        let busy = Busy { _table: PhantomData };
        busy
    }
}

/// Clears the busy mark on drop, including when the hash function unwinds.
struct Busy<'a> {
    #[cfg(debug_assertions)]
    hashing: &'a Cell<bool>,
    #[cfg(not(debug_assertions))]
    _table: PhantomData<&'a ()>,
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.hashing.set(false);
    }
}
