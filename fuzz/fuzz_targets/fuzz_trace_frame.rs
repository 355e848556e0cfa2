//! Fuzz target for DCH trace frames and everything below them.

#![no_main]

use libfuzzer_sys::fuzz_target;
use zwtrace_core::trace::decode_chunk;

fuzz_target!(|data: &[u8]| {
    let _ = decode_chunk(data);
});
