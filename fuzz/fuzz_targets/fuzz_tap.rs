//! Fuzz target for pcap/TAP capture parsing.
//!
//! Tests handling of malformed captures including:
//! - Global header parsing and link type checks
//! - Record headers in either byte order
//! - TAP TLV sections

#![no_main]

use libfuzzer_sys::fuzz_target;
use zwtrace_core::{Capture, DecodeOptions};

fuzz_target!(|data: &[u8]| {
    // Format detection and decoding should never panic
    if let Ok(capture) = Capture::from_bytes(data, DecodeOptions::default()) {
        for _record in capture.chunks() {}
    }
});
