//! Command-line argument definitions.

use clap::Parser;
use std::path::PathBuf;

use zwtrace_core::DecodeOptions;

use super::OutputFormat;

/// Decode Z-Wave radio traces from ZLF and TAP pcap captures.
#[derive(Parser, Debug)]
#[command(name = "zwtrace")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// ZLF trace or pcap capture (optionally gzip-compressed)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output format for stdout
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Stop after this many records
    #[arg(short = 'n', long = "limit", value_name = "N")]
    pub limit: Option<usize>,

    /// Stop once this many capture bytes have been consumed
    #[arg(long = "max-bytes", value_name = "N")]
    pub max_bytes: Option<usize>,

    /// Only print records that carry a fault
    #[arg(long = "faults-only")]
    pub faults_only: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Decode limits requested on the command line.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            max_records: self.limit,
            max_bytes: self.max_bytes,
        }
    }

    /// Default log filter for the `-v` count.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
