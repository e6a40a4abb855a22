//! Chunk-parallel BPE (Byte-Pair Encoding) vocabulary trainer.
//!
//! Starting from raw byte values, training repeatedly counts adjacent symbol
//! pairs, picks the most frequent one (ties go to the lexicographically
//! smallest pair) and replaces every non-overlapping occurrence with a new
//! symbol id, until the target vocabulary size is reached.
//!
//! ```no_run
//! let symbols = bytetrain::corpus::symbols_from_str("ababab");
//! let out = bytetrain::train(symbols, 257)?;
//! assert_eq!(out.symbols(), &[256, 256, 256]);
//! # Ok::<(), bytetrain::TrainError>(())
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(unused_must_use)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

#[macro_use]
extern crate tracing;

mod chunks;
pub mod corpus;
pub mod counter;
mod error;
pub mod merger;
mod merges;
pub mod report;
pub mod selector;
mod trainer;
mod types;

pub use error::{ConfigError, Stage, TrainError};
pub use merges::MergeTable;
pub use trainer::{
    DEFAULT_PARALLEL_THRESHOLD, StopReason, TrainOutput, Trainer, TrainerConfig, train,
};
pub use types::{BYTE_ALPHABET, FrequencyTable, PairFreq, Symbol, SymbolPair};
