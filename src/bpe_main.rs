// src/bpe_main.rs

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use bpe_subword::{BPE, Result};
use clap::Parser;
use env_logger::Env;
use log::{LevelFilter, info};

/// Encode a text file line by line with a trained tokenizer, then decode it
/// back. Writes `encoded.txt` (one JSON id array per line) and `decoded.txt`.
#[derive(Debug, Parser)]
#[command(name = "bpe_main", version)]
struct Args {
    /// Tokenizer JSON written by `bpe_train`.
    tokenizer: PathBuf,
    /// Text to encode.
    input: PathBuf,
    #[arg(long, default_value = "bpe_output")]
    out_dir: PathBuf,
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

    let bpe = BPE::load(&args.tokenizer)?;
    info!(
        "loaded {:?} tokenizer with vocab size {}",
        bpe.variant(),
        bpe.vocab_size()
    );

    fs::create_dir_all(&args.out_dir)?;
    let reader = BufReader::new(File::open(&args.input)?);
    let mut enc_w = BufWriter::new(File::create(args.out_dir.join("encoded.txt"))?);
    let mut dec_w = BufWriter::new(File::create(args.out_dir.join("decoded.txt"))?);

    let mut total_tokens = 0usize;
    let mut lines = 0usize;
    for line in reader.lines() {
        let line = line?;
        let tokens = bpe.encode(&line);
        total_tokens += tokens.len();
        lines += 1;
        writeln!(enc_w, "{}", serde_json::to_string(&tokens)?)?;
        writeln!(dec_w, "{}", bpe.decode(&tokens)?)?;
    }

    enc_w.flush()?;
    dec_w.flush()?;
    info!("encoded {lines} lines into {total_tokens} tokens");
    Ok(())
}
