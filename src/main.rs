// main.rs

use std::fs;
use std::path::PathBuf;

use bpe_subword::{BPE, BpeTrainer, ExhaustionPolicy, Result, TieBreak, Variant};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{LevelFilter, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    /// Pre-tokenize into words; merges stay inside a word.
    Aware,
    /// Raw byte stream, one chunk per line.
    Free,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Aware => Variant::BoundaryAware,
            VariantArg::Free => Variant::BoundaryFree,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TieBreakArg {
    FirstSeen,
    SmallestPair,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::FirstSeen => TieBreak::FirstSeen,
            TieBreakArg::SmallestPair => TieBreak::SmallestPair,
        }
    }
}

/// Train a BPE tokenizer on a text corpus and save it as JSON.
#[derive(Debug, Parser)]
#[command(name = "bpe_train", version)]
struct Args {
    /// UTF-8 text corpus.
    corpus: PathBuf,
    /// Number of merge rules to learn.
    #[arg(short = 'n', long, default_value_t = 50)]
    merges: usize,
    #[arg(long, value_enum, default_value_t = VariantArg::Aware)]
    variant: VariantArg,
    #[arg(long, value_enum, default_value_t = TieBreakArg::FirstSeen)]
    tie_break: TieBreakArg,
    /// Stop early instead of padding the vocabulary when pairs run out.
    #[arg(long)]
    stop_when_exhausted: bool,
    #[arg(long, default_value_t = 1)]
    min_frequency: u64,
    /// Where to write the trained tokenizer.
    #[arg(short, long, default_value = "tokenizer.json")]
    output: PathBuf,
    #[arg(long)]
    progress: bool,
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    let _ = builder.try_init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let exhaustion = if args.stop_when_exhausted {
        ExhaustionPolicy::Stop
    } else {
        ExhaustionPolicy::Pad
    };
    let trainer = BpeTrainer::builder()
        .tie_break(args.tie_break.into())
        .exhaustion(exhaustion)
        .min_frequency(args.min_frequency)
        .show_progress(args.progress)
        .build();

    let corpus = fs::read(&args.corpus)?;
    let mut bpe = BPE::with_trainer(args.variant.into(), trainer);
    let summary = bpe.train_bytes(&corpus, args.merges)?;
    bpe.save(&args.output)?;

    info!(
        "learned {} merges ({} placeholders, {:?}); vocab size {} written to {}",
        summary.merges_learned,
        summary.placeholders,
        summary.stop_reason,
        bpe.vocab_size(),
        args.output.display()
    );
    Ok(())
}
