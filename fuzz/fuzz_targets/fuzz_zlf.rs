//! Fuzz target for ZLF capture parsing.
//!
//! Tests handling of malformed ZLF chunks including:
//! - Declared chunk lengths past the end of input
//! - Dangling bytes after the last chunk
//! - Garbage DCH frames and radio payloads

#![no_main]

use libfuzzer_sys::fuzz_target;
use zwtrace_core::container::zlf::ZLF_HEADER_LEN;
use zwtrace_core::{decode_zlf, DecodeOptions};

fuzz_target!(|data: &[u8]| {
    // Prepend a header so every input reaches the chunk walker
    let mut capture = vec![0u8; ZLF_HEADER_LEN];
    capture.extend_from_slice(data);

    if let Ok(chunks) = decode_zlf(&capture, DecodeOptions::default()) {
        for record in chunks {
            assert!(record.offset < capture.len());
        }
    }
});
