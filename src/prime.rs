//! Prime sizing: every table capacity is routed through these two functions.

/// Trial division over odd candidates up to `floor(sqrt(n))`.
pub fn is_prime(n: usize) -> bool {
    if n == 2 || n == 3 {
        return true;
    }
    if n < 2 || n % 2 == 0 {
        return false;
    }
    let mut factor = 3;
    while factor <= n / factor {
        if n % factor == 0 {
            return false;
        }
        factor += 2;
    }
    true
}

/// Smallest prime at or above `n`, after bumping an even `n` to `n + 1`.
///
/// The bump means `next_prime(2) == 3`; callers that want to keep an
/// already-prime request check [`is_prime`] first.
pub fn next_prime(n: usize) -> usize {
    let mut candidate = if n % 2 == 0 { n + 1 } else { n };
    while !is_prime(candidate) {
        candidate += 2;
    }
    candidate
}

/// Capacity a resize request resolves to: primes are kept as-is.
pub(crate) fn resolve_capacity(requested: usize) -> usize {
    if is_prime(requested) {
        requested
    } else {
        next_prime(requested)
    }
}
