//! Prime table sizing for the bucket table and arena

/// Precomputed table sizes, each roughly 1.2x the previous one.
pub(crate) const PRIMES: [usize; 72] = [
    3, 7, 11, 17, 23, 29, 37, 47, 59, 71, 89, 107, 131, 163, 197, 239, 293, 353, 431, 521, 631,
    761, 919, 1103, 1327, 1597, 1931, 2333, 2801, 3371, 4049, 4861, 5839, 7013, 8419, 10103,
    12143, 14591, 17519, 21023, 25229, 30293, 36353, 43627, 52361, 62851, 75431, 90523, 108631,
    130363, 156437, 187751, 225307, 270371, 324449, 389357, 467237, 560689, 672827, 807403,
    968897, 1162687, 1395263, 1674319, 2009191, 2411033, 2893249, 3471899, 4166287, 4999559,
    5999471, 7199369,
];

/// Largest table size handed out.
pub(crate) const MAX_PRIME: usize = 0x7FEF_FFFD;

/// Smallest table size, used when the arena is first allocated.
pub(crate) const INITIAL_SIZE: usize = PRIMES[0];

/// Trial division, good enough for table sizes past the precomputed range.
pub(crate) fn is_prime(candidate: usize) -> bool {
    if candidate < 2 {
        return false;
    }
    if candidate % 2 == 0 {
        return candidate == 2;
    }

    let mut divisor = 3;
    while divisor <= candidate / divisor {
        if candidate % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

/// Returns the smallest table size that is prime and `>= min`,
/// or `None` if it would exceed [`MAX_PRIME`].
pub(crate) fn next_prime(min: usize) -> Option<usize> {
    if min > MAX_PRIME {
        return None;
    }

    if let Some(&prime) = PRIMES.iter().find(|&&p| p >= min) {
        return Some(prime);
    }

    let mut candidate = min | 1;
    while candidate <= MAX_PRIME {
        if is_prime(candidate) {
            return Some(candidate);
        }
        candidate += 2;
    }
    None
}
