//! Fuzz target for the untiered addendum.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_addendum_parse -- -max_total_time=600

#![no_main]

use libfuzzer_sys::fuzz_target;

use aztier_store::UntieredAddendum;

fuzz_target!(|content: String| {
    if let Ok(addendum) = UntieredAddendum::parse(&content) {
        // Splitting and joining must not lose or add text.
        assert_eq!(addendum.render(), content);
    }
});
