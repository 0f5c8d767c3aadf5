//! Fuzz target for media type parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use panformat::registry::normalize_identifier;
use panformat::MediaType;

fuzz_target!(|data: &str| {
    if let Ok(media_type) = MediaType::parse(data) {
        let _ = media_type.parameter("charset");
        let _ = media_type.to_string();
    }
    let _ = normalize_identifier(data);
});
