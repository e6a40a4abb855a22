//! Pair replacement.
//!
//! A merge replaces every non-overlapping occurrence of a target pair with a
//! single new symbol, scanning greedily left to right: once `(seq[i], seq[i + 1])`
//! is merged, scanning resumes at `i + 2`. For `[X, X, X]` and target `(X, X)`
//! the result is `[R, X]`.
//!
//! The parallel path only cuts the sequence at *safe* positions `p`, where
//! `(seq[p - 1], seq[p])` is not the target pair. The greedy scan always lands
//! exactly on such a position regardless of what came before it, so each chunk
//! can be merged independently and the concatenation equals the sequential result.

use std::ops::Range;

use rayon::prelude::*;

use crate::{
    chunks::even_ranges,
    error::{Stage, TrainError},
    types::{Symbol, SymbolPair},
};

/// Result of rewriting a sequence for one pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The rewritten sequence.
    pub symbols: Vec<Symbol>,
    /// Number of non-overlapping occurrences that were replaced.
    ///
    /// Always equals `input.len() - symbols.len()`.
    pub matches: usize,
}

/// Replaces every greedy, non-overlapping occurrence of `pair` with `new_symbol`.
///
/// # Arguments
///
/// * `seq` - Sequence to rewrite.
/// * `pair` - Target pair.
/// * `new_symbol` - Replacement symbol id.
///
/// # Returns
///
/// The rewritten sequence and the number of replacements. A pair with no
/// occurrences leaves the sequence unchanged.
pub fn merge_pair(seq: &[Symbol], pair: SymbolPair, new_symbol: Symbol) -> MergeOutcome {
    let mut symbols = Vec::with_capacity(seq.len());
    let mut matches = 0;
    let mut i = 0;

    while i < seq.len() {
        if is_match_at(seq, i, pair) {
            symbols.push(new_symbol);
            matches += 1;
            // Both halves are consumed.
            i += 2;
        } else {
            symbols.push(seq[i]);
            i += 1;
        }
    }

    MergeOutcome { symbols, matches }
}

/// Replaces `pair` with `new_symbol` using one fork-join task per chunk.
///
/// Produces exactly the same output as [`merge_pair`]. Runs on the current
/// rayon pool. Chunk results are concatenated in chunk order on the calling
/// thread once every worker has joined.
///
/// # Errors
///
/// Returns [`TrainError::WorkerFailure`] if any worker fails. No partial
/// sequence is returned in that case.
pub fn merge_pair_parallel(
    seq: &[Symbol],
    pair: SymbolPair,
    new_symbol: Symbol,
    workers: usize,
) -> Result<MergeOutcome, TrainError> {
    let ranges = safe_ranges(seq, pair, workers);
    if ranges.len() <= 1 {
        return Ok(merge_pair(seq, pair, new_symbol));
    }

    let parts: Vec<MergeOutcome> = ranges
        .into_par_iter()
        .enumerate()
        .map(|(chunk, range)| merge_chunk(seq, chunk, range, pair, new_symbol))
        .collect::<Result<_, _>>()?;

    let total: usize = parts.iter().map(|p| p.symbols.len()).sum();
    let mut symbols = Vec::with_capacity(total);
    let mut matches = 0;
    for part in parts {
        symbols.extend_from_slice(&part.symbols);
        matches += part.matches;
    }

    Ok(MergeOutcome { symbols, matches })
}

/// Partitions `0..seq.len()` into contiguous ranges split only at safe positions.
///
/// Starts from even nominal cuts and pushes each cut right until the pair
/// ending there is not the target. A cut pushed past the next nominal cut
/// swallows it, so fewer ranges than `workers` may come back.
pub(crate) fn safe_ranges(seq: &[Symbol], pair: SymbolPair, workers: usize) -> Vec<Range<usize>> {
    let nominal = even_ranges(seq.len(), workers);
    let mut ranges = Vec::with_capacity(nominal.len());
    let mut start = 0;

    for r in nominal.iter().skip(1) {
        let mut cut = r.start.max(start);
        while cut < seq.len() && is_match_at(seq, cut - 1, pair) {
            cut += 1;
        }
        if cut >= seq.len() {
            break;
        }
        if cut > start {
            ranges.push(start..cut);
            start = cut;
        }
    }

    if start < seq.len() {
        ranges.push(start..seq.len());
    }

    ranges
}

fn merge_chunk(
    seq: &[Symbol],
    chunk: usize,
    range: Range<usize>,
    pair: SymbolPair,
    new_symbol: Symbol,
) -> Result<MergeOutcome, TrainError> {
    let slice = seq.get(range.clone()).ok_or_else(|| {
        TrainError::chunk_out_of_bounds(Stage::Merging, chunk, range.start, range.end, seq.len())
    })?;

    Ok(merge_pair(slice, pair, new_symbol))
}

#[inline]
fn is_match_at(seq: &[Symbol], i: usize, pair: SymbolPair) -> bool {
    matches!(
        (seq.get(i), seq.get(i + 1)),
        (Some(&a), Some(&b)) if a == pair.0 && b == pair.1
    )
}
