//! zwtrace - Decode Z-Wave radio traces.
//!
//! This crate is the command-line front end over [`zwtrace_core`], which
//! does all of the decoding. The library part only holds the CLI plumbing so
//! it can be tested.
//!
//! # Example
//!
//! ```no_run
//! use zwtrace::cli::{FrameRow, OutputFormat, OutputFormatter};
//! use zwtrace_core::{CaptureSource, DecodeOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     let source = CaptureSource::open("trace.zlf")?;
//!     let capture = source.decode(DecodeOptions::default())?;
//!     let mut out = OutputFormatter::new(OutputFormat::Csv, std::io::stdout())?;
//!     for row in capture.chunks().flat_map(|r| FrameRow::from_record(&r)) {
//!         out.write_row(row)?;
//!     }
//!     out.finish()?;
//!     Ok(())
//! }
//! ```

pub mod cli;

pub use zwtrace_core::{Error, Result};
