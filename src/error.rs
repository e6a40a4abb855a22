//! Error types for BPE training operations.

use std::fmt;

use indicatif::style::TemplateError;

use crate::types::BYTE_ALPHABET;

/// Parallel phase of a training round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Adjacent pair counting.
    Counting,
    /// Pair replacement.
    Merging,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Counting => write!(f, "counting"),
            Self::Merging => write!(f, "merging"),
        }
    }
}

/// Rejected training configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Requested vocabulary does not exceed the byte alphabet.
    VocabSizeTooSmall(usize),
    /// Training was invoked on an empty symbol sequence.
    EmptySequence,
    /// A worker pool of zero threads was requested.
    ZeroWorkers,
    /// The initial sequence holds a symbol outside the byte alphabet.
    ///
    /// Ids from 256 upwards are reserved for merged symbols.
    SymbolOutOfRange {
        /// Position of the first offending symbol.
        index: usize,
        /// The offending symbol.
        symbol: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VocabSizeTooSmall(n) => {
                write!(f, "vocab size must be greater than {BYTE_ALPHABET}, got {n}")
            }
            Self::EmptySequence => write!(f, "initial symbol sequence is empty"),
            Self::ZeroWorkers => write!(f, "worker count must be at least 1"),
            Self::SymbolOutOfRange { index, symbol } => write!(
                f,
                "symbol {symbol} at index {index} is not a byte value (must be below {BYTE_ALPHABET})"
            ),
        }
    }
}

/// Errors that can occur during training.
#[derive(Debug)]
pub enum TrainError {
    /// Pair selection was requested on an empty frequency table.
    ///
    /// The sequence had collapsed to a single symbol, so nothing is left to merge.
    EmptyInput {
        /// Zero-based round index, when raised inside a training run.
        round: Option<usize>,
        /// Number of distinct pairs in the table that was searched.
        table_size: usize,
    },
    /// Trainer configuration or initial input was rejected.
    InvalidConfiguration(ConfigError),
    /// A parallel counting or merging task failed; the round was aborted.
    WorkerFailure {
        /// Zero-based round index, when raised inside a training run.
        round: Option<usize>,
        /// Phase the failed worker belonged to.
        stage: Stage,
        /// Index of the chunk the worker owned.
        chunk: usize,
        /// What went wrong.
        reason: String,
    },
    /// The dedicated worker pool could not be created.
    ThreadPool(rayon::ThreadPoolBuildError),
    /// Progress bar template string was invalid.
    ProgressBarSetup(TemplateError),
}

impl TrainError {
    /// Attaches the round index to errors raised by round-scoped components.
    pub(crate) fn in_round(self, idx: usize) -> Self {
        match self {
            Self::EmptyInput { table_size, .. } => Self::EmptyInput {
                round: Some(idx),
                table_size,
            },
            Self::WorkerFailure {
                stage,
                chunk,
                reason,
                ..
            } => Self::WorkerFailure {
                round: Some(idx),
                stage,
                chunk,
                reason,
            },
            other => other,
        }
    }

    /// Builds a worker failure for a chunk whose index range fell outside the sequence.
    pub(crate) fn chunk_out_of_bounds(
        stage: Stage,
        chunk: usize,
        start: usize,
        end: usize,
        len: usize,
    ) -> Self {
        Self::WorkerFailure {
            round: None,
            stage,
            chunk,
            reason: format!("range {start}..{end} out of bounds for sequence of length {len}"),
        }
    }
}

impl fmt::Display for TrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput { round, table_size } => {
                write!(f, "no mergeable pairs remain (pair table size {table_size})")?;
                if let Some(r) = round {
                    write!(f, " at round {r}")?;
                }
                Ok(())
            }
            Self::InvalidConfiguration(e) => write!(f, "invalid configuration: {e}"),
            Self::WorkerFailure {
                round,
                stage,
                chunk,
                reason,
            } => {
                write!(f, "{stage} worker for chunk {chunk} failed")?;
                if let Some(r) = round {
                    write!(f, " in round {r}")?;
                }
                write!(f, ": {reason}")
            }
            Self::ThreadPool(e) => write!(f, "failed to build worker pool: {e}"),
            Self::ProgressBarSetup(msg) => write!(f, "template parsing failed: {msg}"),
        }
    }
}

impl std::error::Error for TrainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ThreadPool(e) => Some(e),
            Self::ProgressBarSetup(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for TrainError {
    fn from(e: ConfigError) -> Self {
        Self::InvalidConfiguration(e)
    }
}

impl From<rayon::ThreadPoolBuildError> for TrainError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(e)
    }
}

impl From<TemplateError> for TrainError {
    fn from(e: TemplateError) -> Self {
        Self::ProgressBarSetup(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_round_attaches_context() {
        let err = TrainError::EmptyInput {
            round: None,
            table_size: 0,
        }
        .in_round(3);
        assert_eq!(
            err.to_string(),
            "no mergeable pairs remain (pair table size 0) at round 3"
        );
    }

    #[test]
    fn test_worker_failure_display() {
        let err = TrainError::chunk_out_of_bounds(Stage::Merging, 2, 10, 20, 15).in_round(7);
        assert_eq!(
            err.to_string(),
            "merging worker for chunk 2 failed in round 7: range 10..20 out of bounds for sequence of length 15"
        );
    }

    #[test]
    fn test_config_error_converts() {
        let err: TrainError = ConfigError::VocabSizeTooSmall(200).into();
        match err {
            TrainError::InvalidConfiguration(ConfigError::VocabSizeTooSmall(n)) => {
                assert_eq!(n, 200)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_symbol_out_of_range_display() {
        let err = TrainError::from(ConfigError::SymbolOutOfRange {
            index: 2,
            symbol: 256,
        });
        assert_eq!(
            err.to_string(),
            "invalid configuration: symbol 256 at index 2 is not a byte value (must be below 256)"
        );
    }

    #[test]
    fn test_in_round_leaves_other_errors_alone() {
        let err = TrainError::from(ConfigError::ZeroWorkers).in_round(1);
        assert_eq!(
            err.to_string(),
            "invalid configuration: worker count must be at least 1"
        );
    }
}
