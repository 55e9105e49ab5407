//! Compress one file under every default codec configuration and print a
//! size table. The smallest artifact is marked with `*`.
//!
//! Usage: `codec-report <file> [--out DIR] [--passphrase P]`

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use news_digest::compress::codecs::default_codecs;
use news_digest::compress::{prepare_output_dir, select_best, CompressionTrial};
use news_digest::config::Secret;

#[derive(Parser, Debug)]
#[command(name = "codec-report")]
struct Args {
    /// File to compress
    input: PathBuf,

    /// Where the artifacts go (wiped first)
    #[arg(long, default_value = "compress_report")]
    out: PathBuf,

    #[arg(long, env = "DIGEST_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let args = Args::parse();

    let data = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    prepare_output_dir(&args.out)?;

    let configs = default_codecs();
    let trial = CompressionTrial::new(&args.out, &args.input)
        .with_passphrase(args.passphrase.map(Secret::new));
    let results = trial.trial_all(&data, &configs).await;
    let best = select_best(&results)?;

    println!("{:<20} {:>10}  status", "codec", "bytes");
    for cfg in &configs {
        match results.iter().find(|r| r.codec_name == cfg.name) {
            Some(r) => {
                let mark = if r.codec_name == best.codec_name { "*" } else { "" };
                println!("{:<20} {:>10}  ok{mark}", r.codec_name, r.size_bytes);
            }
            None => println!("{:<20} {:>10}  skipped", cfg.name, "-"),
        }
    }
    println!(
        "input {} bytes, best {} at {} bytes",
        data.len(),
        best.codec_name,
        best.size_bytes
    );
    Ok(())
}
