//! Fuzz target for CSV reading.
//!
//! Arbitrary bytes go through the CSV plugin with and without a header row.
//! Invalid UTF-8 and ragged tables must surface as errors, never panics.

#![no_main]

use libfuzzer_sys::fuzz_target;
use panformat::plugin::CsvPlugin;
use panformat::{Document, FormatPlugin, MediaType, Params};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(media_type) = MediaType::parse("text/csv") else {
        return;
    };
    let doc = Document::binary(data, media_type);
    let plugin = CsvPlugin::new();

    let _ = plugin.read(&doc, &Params::new());
    let _ = plugin.read(&doc, &Params::new().with("UseHeader", false));
});
