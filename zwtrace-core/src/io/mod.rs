//! Capture I/O.
//!
//! A [`CaptureSource`] owns the bytes of one capture. Files are
//! memory-mapped when the `mmap` feature is enabled (the default) and read
//! into memory otherwise. Gzip-compressed files are detected by magic and
//! inflated into memory.

mod decompress;
mod source;

pub use decompress::{inflate, Compression};
pub use source::CaptureSource;
