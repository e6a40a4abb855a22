//! BPE training loop.
//!
//! Each round counts adjacent pairs, selects the most frequent one, assigns it
//! the next synthetic symbol id (256, 257, ...) and rewrites the sequence.
//! Rounds are strictly sequential because round `n + 1` reads the fully
//! materialized output of round `n`; parallelism lives only inside a round's
//! counting and merging phases, each of which ends in a fork-join barrier.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle, style::TemplateError};

use crate::{
    counter::{count_pairs, count_pairs_parallel},
    error::{ConfigError, TrainError},
    merger::{MergeOutcome, merge_pair, merge_pair_parallel},
    merges::MergeTable,
    selector::select_pair,
    types::{BYTE_ALPHABET, FrequencyTable, Symbol, SymbolPair},
};

/// Sequences shorter than this are counted and merged on the calling thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 16_384;

/// Tunables for a training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainerConfig {
    /// Target vocabulary size, byte alphabet included. Must exceed 256.
    pub vocab_size: usize,

    /// Worker pool size. `None` uses the available hardware parallelism.
    pub num_workers: Option<usize>,

    /// Minimum sequence length for the chunk-parallel counter and merger.
    ///
    /// Results are identical either way; this only skips fork-join overhead
    /// on short sequences.
    pub parallel_threshold: usize,

    /// Whether to draw a progress bar over rounds.
    pub show_progress: bool,
}

impl TrainerConfig {
    pub fn new(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            num_workers: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            show_progress: false,
        }
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.num_workers = Some(workers);
        self
    }

    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Number of rounds requested, `vocab_size - 256`.
    pub fn num_merges(&self) -> usize {
        self.vocab_size.saturating_sub(BYTE_ALPHABET)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.vocab_size <= BYTE_ALPHABET {
            return Err(ConfigError::VocabSizeTooSmall(self.vocab_size));
        }
        if self.num_workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }
}

/// Why training stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// All `vocab_size - 256` rounds ran.
    Completed,
    /// The sequence collapsed to one symbol before every round could run.
    Exhausted {
        /// Rounds requested by the configuration.
        requested: usize,
        /// Rounds actually performed.
        performed: usize,
    },
}

/// Final sequence and merge table of a training run.
#[derive(Debug, Clone)]
pub struct TrainOutput {
    symbols: Vec<Symbol>,
    merges: MergeTable,
    original_len: usize,
    stop: StopReason,
}

impl TrainOutput {
    /// The compressed sequence.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Merges in the order they were learned.
    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    /// Sequence length before training.
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Sequence length after training.
    pub fn final_len(&self) -> usize {
        self.symbols.len()
    }

    /// `original_len / final_len`.
    pub fn compression_ratio(&self) -> f64 {
        self.original_len as f64 / self.final_len().max(1) as f64
    }

    /// Byte alphabet plus one symbol per merge performed.
    pub fn vocab_size(&self) -> usize {
        BYTE_ALPHABET + self.merges.len()
    }

    pub fn stop_reason(&self) -> StopReason {
        self.stop
    }

    /// Splits the output into the final sequence and the merge table.
    pub fn into_parts(self) -> (Vec<Symbol>, MergeTable) {
        (self.symbols, self.merges)
    }
}

/// BPE trainer owning a dedicated worker pool.
///
/// The pool is sized once at construction and reused by every round.
#[derive(Debug)]
pub struct Trainer {
    config: TrainerConfig,
    pool: rayon::ThreadPool,
}

impl Trainer {
    /// Validates `config` and builds the worker pool.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::InvalidConfiguration`] for a vocabulary size of
    /// 256 or less or a zero worker count, and [`TrainError::ThreadPool`] if
    /// the pool cannot be spawned.
    pub fn new(config: TrainerConfig) -> Result<Self, TrainError> {
        config.validate()?;

        // num_threads(0) lets rayon pick the available parallelism.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_workers.unwrap_or(0))
            .thread_name(|i| format!("bytetrain-{i}"))
            .build()?;

        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Number of threads in the worker pool, which is also the chunk count.
    pub fn num_workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Trains a merge table over `initial` for `vocab_size - 256` rounds.
    ///
    /// # Arguments
    ///
    /// * `initial` - Starting symbols, all raw byte values (`0..256`).
    ///
    /// # Returns
    ///
    /// The final sequence and merge table. If the sequence collapses to a single
    /// symbol after at least one round, training stops early with
    /// [`StopReason::Exhausted`] and fewer merges than requested.
    ///
    /// # Errors
    ///
    /// * [`TrainError::InvalidConfiguration`] if `initial` is empty or holds a
    ///   symbol of 256 or above, which would clash with merged ids.
    /// * [`TrainError::EmptyInput`] if `initial` has a single symbol, so the
    ///   very first round has nothing to select.
    /// * [`TrainError::WorkerFailure`] if a counting or merging worker fails;
    ///   the run is aborted and no partial output is returned.
    /// * [`TrainError::ProgressBarSetup`] if the progress bar cannot be styled.
    pub fn train(&self, initial: Vec<Symbol>) -> Result<TrainOutput, TrainError> {
        if initial.is_empty() {
            return Err(ConfigError::EmptySequence.into());
        }
        if let Some((index, &symbol)) = initial
            .iter()
            .enumerate()
            .find(|&(_, &s)| s >= BYTE_ALPHABET)
        {
            return Err(ConfigError::SymbolOutOfRange { index, symbol }.into());
        }

        let requested = self.config.num_merges();
        let original_len = initial.len();
        let pb = self.progress_bar(requested as u64, "Training merges")?;

        info!(
            original_len,
            requested,
            workers = self.num_workers(),
            "starting BPE training"
        );

        let mut seq = initial;
        let mut merges = MergeTable::new();
        let mut stop = StopReason::Completed;

        for round in 0..requested {
            let freqs = self.count(&seq).map_err(|e| e.in_round(round))?;

            let (pair, freq) = match select_pair(&freqs) {
                Ok(best) => best,
                Err(_) if !merges.is_empty() => {
                    warn!(
                        performed = round,
                        requested, "no more pairs to merge, stopping early"
                    );
                    stop = StopReason::Exhausted {
                        requested,
                        performed: round,
                    };
                    break;
                }
                Err(e) => return Err(e.in_round(round)),
            };

            let new_symbol = BYTE_ALPHABET + round;
            let outcome = self
                .merge(&seq, pair, new_symbol)
                .map_err(|e| e.in_round(round))?;
            debug_assert_eq!(outcome.symbols.len(), seq.len() - outcome.matches);

            debug!(
                round,
                left = pair.left(),
                right = pair.right(),
                freq,
                new_symbol,
                table_size = freqs.len(),
                before = seq.len(),
                after = outcome.symbols.len(),
                "merged pair"
            );

            merges.push(pair, new_symbol);
            seq = outcome.symbols;
            pb.inc(1);
        }

        pb.finish_and_clear();

        let output = TrainOutput {
            symbols: seq,
            merges,
            original_len,
            stop,
        };

        info!(
            merges = output.merges.len(),
            final_len = output.final_len(),
            ratio = output.compression_ratio(),
            "finished BPE training"
        );

        Ok(output)
    }

    fn count(&self, seq: &[Symbol]) -> Result<FrequencyTable, TrainError> {
        if !self.use_parallel(seq) {
            return Ok(count_pairs(seq));
        }
        let workers = self.num_workers();
        self.pool.install(|| count_pairs_parallel(seq, workers))
    }

    fn merge(
        &self,
        seq: &[Symbol],
        pair: SymbolPair,
        new_symbol: Symbol,
    ) -> Result<MergeOutcome, TrainError> {
        if !self.use_parallel(seq) {
            return Ok(merge_pair(seq, pair, new_symbol));
        }
        let workers = self.num_workers();
        self.pool
            .install(|| merge_pair_parallel(seq, pair, new_symbol, workers))
    }

    fn use_parallel(&self, seq: &[Symbol]) -> bool {
        self.num_workers() > 1 && seq.len() >= self.config.parallel_threshold
    }

    /// Creates a styled progress bar, hidden unless progress display is enabled.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] if the progress bar style template is invalid.
    fn progress_bar(&self, size: u64, msg: &str) -> Result<ProgressBar, TemplateError> {
        let pb = ProgressBar::new(size);

        if !self.config.show_progress {
            pb.set_draw_target(ProgressDrawTarget::hidden());
            return Ok(pb);
        }

        let style =
            ProgressStyle::default_bar().template("[{elapsed_precise}] {msg:<20!} {wide_bar} {pos}/{len}")?;
        pb.set_style(style);
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_secs(1));

        Ok(pb)
    }
}

/// Trains with default settings: one worker per available core, no progress bar.
///
/// # Errors
///
/// See [`Trainer::new`] and [`Trainer::train`].
pub fn train(initial_symbols: Vec<Symbol>, vocab_size: usize) -> Result<TrainOutput, TrainError> {
    Trainer::new(TrainerConfig::new(vocab_size))?.train(initial_symbols)
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    fn trainer(vocab_size: usize, workers: usize) -> Trainer {
        let config = TrainerConfig::new(vocab_size)
            .with_workers(workers)
            .with_parallel_threshold(0);
        match Trainer::new(config) {
            Ok(t) => t,
            Err(e) => panic!("trainer should build: {e}"),
        }
    }

    #[test]
    fn test_ababab_end_to_end() {
        let out = train(vec![97, 98, 97, 98, 97, 98], 257).expect("training should succeed");
        assert_eq!(out.symbols(), &[256, 256, 256]);
        assert_eq!(out.merges().to_history(), vec![((97, 98), 256)]);
        assert_eq!(out.original_len(), 6);
        assert_eq!(out.final_len(), 3);
        assert_eq!(out.compression_ratio(), 2.0);
        assert_eq!(out.vocab_size(), 257);
        assert_eq!(out.stop_reason(), StopReason::Completed);

        let (symbols, merges) = out.into_parts();
        assert_eq!(symbols, vec![256, 256, 256]);
        assert_eq!(merges.get(SymbolPair(97, 98)), Some(256));
        assert_eq!(merges.len(), 1);
    }

    #[test]
    fn test_symbols_assigned_in_round_order() {
        let out = trainer(259, 2)
            .train(vec![97, 98, 99, 97, 98, 99, 97, 98])
            .expect("training should succeed");
        let assigned: Vec<Symbol> = out.merges().iter().map(|(_, s)| s).collect();
        assert_eq!(assigned, vec![256, 257, 258]);
        assert_eq!(out.merges().get(SymbolPair(97, 98)), Some(256));
    }

    #[test]
    fn test_single_symbol_is_empty_input() {
        match train(vec![42], 300) {
            Err(TrainError::EmptyInput { round, table_size }) => {
                assert_eq!(round, Some(0));
                assert_eq!(table_size, 0);
            }
            other => panic!("expected empty input error, got {other:?}"),
        }
    }

    #[test]
    fn test_early_termination_records_performed_merges() {
        // [1,2,3,4] -> [256,3,4] -> [256,257] -> [258], then nothing is left.
        let out = trainer(300, 1)
            .train(vec![1, 2, 3, 4])
            .expect("training should succeed");
        assert_eq!(out.merges().len(), 3);
        assert_eq!(out.symbols(), &[258]);
        assert_eq!(
            out.stop_reason(),
            StopReason::Exhausted {
                requested: 44,
                performed: 3
            }
        );
    }

    #[test]
    fn test_rejects_small_vocab() {
        match train(vec![1, 2, 3], 256) {
            Err(TrainError::InvalidConfiguration(ConfigError::VocabSizeTooSmall(256))) => {}
            other => panic!("expected invalid configuration, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_empty_sequence() {
        match train(Vec::new(), 300) {
            Err(TrainError::InvalidConfiguration(ConfigError::EmptySequence)) => {}
            other => panic!("expected invalid configuration, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_symbols_outside_byte_alphabet() {
        // A literal 256 would be indistinguishable from the first merged symbol.
        match train(vec![1, 2, 256, 1, 2], 257) {
            Err(TrainError::InvalidConfiguration(ConfigError::SymbolOutOfRange {
                index,
                symbol,
            })) => {
                assert_eq!(index, 2);
                assert_eq!(symbol, 256);
            }
            other => panic!("expected invalid configuration, got {other:?}"),
        }
        assert!(train(vec![0, 255, 0, 255], 257).is_ok());
    }

    #[test]
    fn test_config_accessor_reflects_builder() {
        let t = trainer(300, 3);
        assert_eq!(t.config().vocab_size, 300);
        assert_eq!(t.config().num_workers, Some(3));
        assert_eq!(t.config().parallel_threshold, 0);
        assert_eq!(t.num_workers(), 3);
    }

    #[test]
    fn test_rejects_zero_workers() {
        match Trainer::new(TrainerConfig::new(300).with_workers(0)) {
            Err(TrainError::InvalidConfiguration(ConfigError::ZeroWorkers)) => {}
            other => panic!("expected invalid configuration, got {other:?}"),
        }
    }

    #[test]
    fn test_parallel_training_matches_sequential() {
        let mut rng = StdRng::seed_from_u64(3);
        let text: Vec<Symbol> = (0..3_000).map(|_| rng.random_range(97..101)).collect();

        let expected = trainer(320, 1).train(text.clone()).expect("training should succeed");
        for workers in [2, 3, 5, 8] {
            let got = trainer(320, workers)
                .train(text.clone())
                .expect("training should succeed");
            assert_eq!(got.symbols(), expected.symbols(), "workers={workers}");
            assert_eq!(got.merges(), expected.merges(), "workers={workers}");
        }
    }

    #[test]
    fn test_length_never_grows() {
        let text: Vec<Symbol> = b"the quick brown fox jumps over the lazy dog, the end"
            .iter()
            .map(|&b| b as Symbol)
            .collect();
        let mut prev = text.len();
        for vocab in 257..280 {
            let out = trainer(vocab, 4).train(text.clone()).expect("training should succeed");
            assert!(out.final_len() <= prev);
            prev = out.final_len();
        }
    }
}
