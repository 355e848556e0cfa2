//! zwtrace CLI entry point.

use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use zwtrace::cli::{Args, FrameRow, OutputFormatter};
use zwtrace_core::CaptureSource;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Set up logging
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| args.log_filter().into()),
        )
        .init();

    let source = CaptureSource::open(&args.file)
        .with_context(|| format!("Failed to open capture: {}", args.file.display()))?;
    let capture = source
        .decode(args.decode_options())
        .with_context(|| format!("Failed to decode capture: {}", args.file.display()))?;
    info!(
        format = %capture.format(),
        compression = %source.compression(),
        "decoding {}",
        args.file.display()
    );

    let stdout = io::stdout();
    let mut formatter = OutputFormatter::new(args.format, BufWriter::new(stdout.lock()))?;

    let mut chunks = capture.chunks();
    let mut records = 0usize;
    let mut faults = 0usize;
    for record in chunks.by_ref() {
        records += 1;
        let is_ok = record.is_ok();
        if !is_ok {
            faults += 1;
        }
        if args.faults_only && is_ok {
            continue;
        }
        for row in FrameRow::from_record(&record) {
            formatter.write_row(row)?;
        }
    }
    formatter.finish()?;

    info!(
        records,
        faults,
        trailing_bytes = chunks.trailing_bytes(),
        "done"
    );
    Ok(())
}
