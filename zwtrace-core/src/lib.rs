//! # zwtrace-core
//!
//! Decoder for Z-Wave radio traces.
//!
//! This crate turns ZLF trace files and TAP-annotated pcap captures into
//! over-the-air Z-Wave MAC frames. It has no output or engine dependencies and
//! can be used standalone or behind the `zwtrace` CLI.
//!
//! ## Features
//!
//! - **Containers**: ZLF traces and classic pcap (link types 261, 262, 297),
//!   either byte order, µs or ns timestamps, gzip compression
//! - **Trace Frames**: DCH v2 and v3 envelopes, several frames per chunk
//! - **Radio Diagnostics**: PTI hardware markers and the appended-info trailer
//!   (RSSI, RAIL region, channel, direction)
//! - **MAC Frames**: classic 2-channel and 3-channel, long range, wake-up
//!   beams, multicast, checksum verification
//! - **Lazy Decoding**: records are decoded one at a time, per-record faults
//!   never abort the capture
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zwtrace_core::prelude::*;
//!
//! let source = CaptureSource::open("trace.zlf").unwrap();
//! let capture = source.decode(DecodeOptions::default()).unwrap();
//!
//! for record in capture.chunks() {
//!     match record.frame().map(|f| &f.mac) {
//!         Some(Ok(mac)) => println!("{}: {} from {:?}", record.index, mac.variant_name(), mac.src_node_id()),
//!         Some(Err(fault)) => println!("{}: {}", record.index, fault),
//!         None => println!("{}: {:?}", record.index, record.fault()),
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                        zwtrace-core                                 |
//! +---------------------------------------------------------------------+
//! |  io/         - CaptureSource, mmap and gzip support                 |
//! |  format      - CaptureFormat detection                              |
//! |  container/  - ZLF chunks, pcap/TAP records, DecodeOptions          |
//! |  trace/      - DCH v2/v3 trace frames                               |
//! |  radio/      - PTI radio payload, diagnostics, RAIL regions         |
//! |  mac/        - MAC layouts, beams, checksums                        |
//! |  model       - ChunkRecord, RadioFrame, Timestamp                   |
//! |  cursor      - bit/byte reader and writer                           |
//! |  error       - Error types                                          |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Crate Features
//!
//! - `default` - `mmap` enabled
//! - `mmap` - memory-map capture files instead of reading them

pub mod container;
pub mod cursor;
pub mod error;
pub mod format;
pub mod io;
pub mod mac;
pub mod model;
pub mod prelude;
pub mod radio;
pub mod trace;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types at crate root for convenience
pub use container::{decode_tap, decode_zlf, Capture, CaptureHeader, Chunks, DecodeOptions};
pub use error::{DecodeFault, Error, FormatError, Result};
pub use format::CaptureFormat;
pub use io::{CaptureSource, Compression};
pub use mac::{MacFrame, PhyLayout};
pub use model::{ChunkRecord, ContainerMeta, RadioFrame, TapInfo, Timestamp};
pub use radio::{Diagnostics, Direction, RegionId};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
