#[macro_use]
extern crate tracing;

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;

use bytetrain::{
    Trainer, TrainerConfig, corpus::load_symbols, counter::count_pairs, report,
};

#[derive(Parser)]
#[command(version, about = "Train a byte-level BPE merge table over a corpus file", long_about = None)]
struct Cli {
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Target vocabulary size, byte alphabet included.
    #[arg(short = 's', long, default_value = "2048")]
    vocab_size: usize,
    /// Worker threads per round. Defaults to the available parallelism.
    #[arg(short = 'w', long = "workers")]
    num_workers: Option<usize>,
    #[arg(long, default_value_t = bytetrain::DEFAULT_PARALLEL_THRESHOLD)]
    parallel_threshold: usize,
    #[arg(long)]
    progress: bool,
    /// Print the N most frequent pairs of the input before training.
    #[arg(long, value_name = "N")]
    show_pairs: Option<usize>,
    /// Print the final symbol vector.
    #[arg(long)]
    show_symbols: bool,
    #[arg(value_parser = clap::value_parser!(PathBuf))]
    input_file: PathBuf,
}

impl Cli {
    fn trainer_config(&self) -> TrainerConfig {
        let mut config = TrainerConfig::new(self.vocab_size)
            .with_parallel_threshold(self.parallel_threshold)
            .with_progress(self.progress);
        if let Some(workers) = self.num_workers {
            config = config.with_workers(workers);
        }
        config
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    debug!("Vocabulary size: {}", cli.vocab_size);
    debug!("Input file: {}", cli.input_file.display());

    let symbols = load_symbols(&cli.input_file)?;

    if let Some(limit) = cli.show_pairs {
        print!("{}", report::format_pair_table(&count_pairs(&symbols), limit));
    }

    let trainer = Trainer::new(cli.trainer_config())?;
    info!("Training BPE merges with {} workers...", trainer.num_workers());
    let output = trainer.train(symbols)?;

    if cli.show_symbols {
        print!("{}", report::format_symbols(output.symbols()));
    }
    print!("{}", report::format_summary(&output));
    Ok(())
}

fn log_level(verbose: u8) -> tracing::Level {
    match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
