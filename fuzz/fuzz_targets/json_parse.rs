//! Fuzz target for JSON parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the canonical JSON parser,
//! checking for panics, crashes, or hangs. Anything that parses must
//! serialize and parse back to the same value.

#![no_main]

use libfuzzer_sys::fuzz_target;
use panformat::value::json::{from_json_slice, from_json_str, to_json_string};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(value) = from_json_slice(data) {
        let json = to_json_string(&value).expect("parsed value serializes");
        assert_eq!(from_json_str(&json).expect("serialized value parses"), value);
    }
});
