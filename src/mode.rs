//! Most-frequent-element search on top of [`ChainingMap`].

use crate::chaining::ChainingMap;

/// Return the most frequent element(s) of `items` and their frequency, in one
/// pass.
///
/// Ties are reported in the order each element reached the winning count.
/// An element is listed at most once: its count only grows, so it cannot
/// meet the same best count twice. Empty input yields `(vec![], 0)`.
pub fn find_mode<I>(items: I) -> (Vec<String>, usize)
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut counts: ChainingMap<usize> = ChainingMap::new();
    let mut modes: Vec<String> = Vec::new();
    let mut best = 0;

    for item in items {
        let key = item.as_ref();
        let count = counts.get(key).copied().unwrap_or(0) + 1;
        counts.put(key.to_owned(), count);

        if count > best {
            best = count;
            modes.clear();
            modes.push(key.to_owned());
        } else if count == best {
            modes.push(key.to_owned());
        }
    }
    (modes, best)
}
