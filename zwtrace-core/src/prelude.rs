//! Convenient re-exports for common usage.
//!
//! # Example
//!
//! ```rust,no_run
//! use zwtrace_core::prelude::*;
//!
//! let source = CaptureSource::open("capture.pcap").unwrap();
//! let records = source.decode(DecodeOptions::new().with_max_records(10)).unwrap();
//! ```

// Containers
pub use crate::container::{Capture, Chunks, DecodeOptions};
pub use crate::format::CaptureFormat;

// I/O types
pub use crate::io::CaptureSource;

// Decoded model
pub use crate::mac::{HeaderType, MacFrame, MacPayload};
pub use crate::model::{ChunkRecord, RadioFrame, Timestamp};
pub use crate::radio::{Diagnostics, Direction, RegionId};

// Error types
pub use crate::error::{DecodeFault, Error, Result};
