//! Command-line interface module.
//!
//! This module handles:
//! - Argument parsing via clap
//! - Flattening decoded records into output rows
//! - Output formatting (table, CSV, JSON)

mod args;
mod output;

pub use args::Args;
pub use output::{FrameRow, OutputFormat, OutputFormatter};
