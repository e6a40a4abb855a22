//! Adjacent pair counting.
//!
//! Both the sequential and the chunk-parallel path produce numerically
//! identical tables for the same input. In the parallel path every worker owns
//! a disjoint range of *pair start* indices `s..e` and reads one extra symbol
//! of lookahead (`seq[e]`), so the pair straddling two chunks is counted by
//! the earlier chunk exactly once.

use std::ops::Range;

use rayon::prelude::*;

use crate::{
    chunks::even_ranges,
    error::{Stage, TrainError},
    types::{FrequencyTable, Symbol, SymbolPair},
};

/// Counts every adjacent pair `(seq[i], seq[i + 1])` on the calling thread.
///
/// # Returns
///
/// An empty table when `seq.len() <= 1`. Otherwise the counts sum to `seq.len() - 1`.
pub fn count_pairs(seq: &[Symbol]) -> FrequencyTable {
    let mut freqs = FrequencyTable::new();
    accumulate(&mut freqs, seq);
    freqs
}

/// Counts adjacent pairs with one fork-join task per chunk.
///
/// Runs on the current rayon pool; the trainer installs its own pool before
/// calling this. Partial tables are summed on the calling thread after every
/// worker has joined.
///
/// # Arguments
///
/// * `seq` - Sequence to scan.
/// * `workers` - Desired number of chunks. Clamped to `1..=seq.len() - 1`.
///
/// # Errors
///
/// Returns [`TrainError::WorkerFailure`] if any worker fails. No partial table
/// is returned in that case.
pub fn count_pairs_parallel(seq: &[Symbol], workers: usize) -> Result<FrequencyTable, TrainError> {
    if seq.len() <= 1 {
        return Ok(FrequencyTable::new());
    }

    let ranges = even_ranges(seq.len() - 1, workers);
    if ranges.len() == 1 {
        return Ok(count_pairs(seq));
    }

    let partials: Vec<FrequencyTable> = ranges
        .into_par_iter()
        .enumerate()
        .map(|(chunk, range)| count_chunk(seq, chunk, range))
        .collect::<Result<_, _>>()?;

    // Single owner for the shared table: fold after join.
    let mut partials = partials.into_iter();
    let mut freqs = partials.next().unwrap_or_default();
    for partial in partials {
        for (pair, freq) in partial {
            *freqs.entry(pair).or_insert(0) += freq;
        }
    }

    Ok(freqs)
}

/// Counts the pairs starting at indices in `range`.
fn count_chunk(
    seq: &[Symbol],
    chunk: usize,
    range: Range<usize>,
) -> Result<FrequencyTable, TrainError> {
    // One symbol of lookahead so the seam pair belongs to this chunk.
    let end = range.end + 1;
    let window = seq.get(range.start..end).ok_or_else(|| {
        TrainError::chunk_out_of_bounds(Stage::Counting, chunk, range.start, end, seq.len())
    })?;

    let mut freqs = FrequencyTable::new();
    accumulate(&mut freqs, window);
    Ok(freqs)
}

#[inline]
fn accumulate(freqs: &mut FrequencyTable, seq: &[Symbol]) {
    for w in seq.windows(2) {
        *freqs.entry(SymbolPair(w[0], w[1])).or_insert(0) += 1;
    }
}
