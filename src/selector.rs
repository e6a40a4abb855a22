//! Selection of the next pair to merge.

use crate::{
    error::TrainError,
    types::{FrequencyTable, PairFreq, SymbolPair},
};

/// Returns the most frequent pair and its count.
///
/// Single linear pass with a running maximum. Ties on frequency go to the
/// lexicographically smallest `(left, right)`, so the result never depends on
/// hash map iteration order.
///
/// # Errors
///
/// Returns [`TrainError::EmptyInput`] if `freqs` is empty.
pub fn select_pair(freqs: &FrequencyTable) -> Result<(SymbolPair, PairFreq), TrainError> {
    let mut best: Option<(SymbolPair, PairFreq)> = None;

    for (&pair, &freq) in freqs {
        best = match best {
            Some((best_pair, best_freq))
                if freq < best_freq || (freq == best_freq && pair > best_pair) =>
            {
                Some((best_pair, best_freq))
            }
            _ => Some((pair, freq)),
        };
    }

    best.ok_or(TrainError::EmptyInput {
        round: None,
        table_size: freqs.len(),
    })
}
