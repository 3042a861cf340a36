//! Fuzz target for tiered record decoding.
//!
//! Arbitrary bytes must either decode into assets or be rejected without
//! panicking. Decoded records must survive a render and decode.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_record_parse -- -max_total_time=600

#![no_main]

use libfuzzer_sys::fuzz_target;

use aztier_store::{parse_record, render_record};

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(assets) = parse_record(content) else {
        return;
    };

    let rendered = render_record(&assets).expect("decoded assets must render");
    let decoded = parse_record(&rendered).expect("a rendered record must decode");
    let ids = |assets: &[aztier_core::Asset]| {
        assets.iter().map(|a| a.id().to_string()).collect::<Vec<_>>()
    };
    assert_eq!(ids(&decoded), ids(&assets));
});
