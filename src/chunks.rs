//! Contiguous range partitioning shared by the parallel counter and merger.

use std::ops::Range;

/// Splits `0..len` into contiguous, disjoint ranges, one per worker.
///
/// The number of ranges is `workers` clamped to `1..=len`, so small inputs
/// fall back to fewer (or a single) chunk. Every range but the last has
/// `len / n` elements; the last absorbs the remainder.
///
/// # Returns
///
/// Ranges in ascending order covering `0..len` exactly. Empty when `len == 0`.
pub(crate) fn even_ranges(len: usize, workers: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }

    let n = workers.clamp(1, len);
    let size = len / n;

    (0..n)
        .map(|i| {
            let start = i * size;
            let end = if i + 1 == n { len } else { start + size };
            start..end
        })
        .collect()
}
