//! The trained artifact: an ordered record of which pair became which symbol.

use std::collections::HashMap;

use crate::types::{Symbol, SymbolPair};

/// Append-only, ordered mapping from merged pair to the symbol it became.
///
/// Entries are kept in merge order (round 0 first). Lookup by pair is backed
/// by an index so [`MergeTable::get`] does not scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeTable {
    /// `(pair, new_symbol)` in merge order.
    entries: Vec<(SymbolPair, Symbol)>,

    /// pair -> position in `entries`.
    index: HashMap<SymbolPair, usize>,
}

impl MergeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one round's merge.
    ///
    /// A pair is merged at most once per training run, since every occurrence
    /// disappears from the sequence when it is merged.
    pub(crate) fn push(&mut self, pair: SymbolPair, new_symbol: Symbol) {
        self.index.insert(pair, self.entries.len());
        self.entries.push((pair, new_symbol));
    }

    /// Number of merges performed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Symbol assigned to `pair`, if it was merged.
    pub fn get(&self, pair: SymbolPair) -> Option<Symbol> {
        self.index
            .get(&pair)
            .and_then(|&i| self.entries.get(i))
            .map(|&(_, sym)| sym)
    }

    /// Most recent merge.
    pub fn last(&self) -> Option<(SymbolPair, Symbol)> {
        self.entries.last().copied()
    }

    /// Iterates `(pair, new_symbol)` in merge order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolPair, Symbol)> + '_ {
        self.entries.iter().copied()
    }

    /// Returns the merges as `((left, right), merged)` tuples in merge order.
    ///
    /// This is the merge-history shape consumed by byte-level BPE encoders.
    pub fn to_history(&self) -> Vec<((Symbol, Symbol), Symbol)> {
        self.entries
            .iter()
            .map(|&(pair, sym)| ((pair.0, pair.1), sym))
            .collect()
    }
}

impl<'a> IntoIterator for &'a MergeTable {
    type Item = (SymbolPair, Symbol);
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, (SymbolPair, Symbol)>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().copied()
    }
}
