//! Fuzz target for the tier document parser.
//!
//! Parsing arbitrary Markdown must never panic, and a document that parses
//! must render and parse again to the same rows.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_document_parse -- -max_total_time=600

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::collections::HashMap;

use aztier_core::AssetCategory;
use aztier_store::{parse_document, render_document};

#[derive(Arbitrary, Debug)]
struct DocumentInput {
    content: String,
    category: u8,
}

fuzz_target!(|input: DocumentInput| {
    if input.content.len() > 64 * 1024 {
        return;
    }

    let category = AssetCategory::ALL[usize::from(input.category) % AssetCategory::ALL.len()];
    let ids = HashMap::new();

    let Ok(assets) = parse_document(&input.content, category, &ids) else {
        return;
    };

    let rendered = render_document(&input.content, category, &assets, "https://fuzz.test/docs")
        .expect("a parsed document must render");
    let reparsed =
        parse_document(&rendered, category, &ids).expect("a rendered document must parse");
    assert_eq!(reparsed.len(), assets.len());
});
