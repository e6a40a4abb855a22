//! Symbol ids, pairs and the per-round frequency table.
//!
//! Byte values and merged symbols share one id space: `0..256` are bytes,
//! everything above is handed out by the trainer one merge at a time.

use std::collections::HashMap;

/// Represents a symbol identifier in the sequence being compressed.
///
/// Values `0..=255` are literal byte values. Values from [`BYTE_ALPHABET`]
/// upwards are synthetic symbols created by merges, assigned sequentially
/// in round order.
pub type Symbol = usize;

/// Occurrence count of an adjacent symbol pair within one round.
pub type PairFreq = usize;

/// Number of literal byte symbols. The first merged symbol gets this id.
pub const BYTE_ALPHABET: Symbol = 256;

/// A pair of adjacent symbols `(left, right)`.
///
/// Equality and hashing use both components in order, so `(a, b)` and
/// `(b, a)` are different pairs unless `a == b`. The derived `Ord` is
/// lexicographic by `(left, right)` and is what breaks frequency ties
/// during selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolPair(pub Symbol, pub Symbol);

impl SymbolPair {
    /// Left symbol of the pair.
    pub fn left(self) -> Symbol {
        self.0
    }

    /// Right symbol of the pair.
    pub fn right(self) -> Symbol {
        self.1
    }
}

/// Frequency of every adjacent pair in a sequence.
///
/// Built fresh each round and discarded once the round's pair is chosen.
pub type FrequencyTable = HashMap<SymbolPair, PairFreq>;
