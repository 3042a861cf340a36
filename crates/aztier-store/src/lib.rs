//! # Catalogue persistence
//!
//! Reads and writes the files a catalogue repository keeps per category:
//!
//! - the structured record (`tiered-*.json`), a pretty-printed JSON array
//! - the tier document (`README.md`), whose table rows mirror the record
//! - the untiered addendum, a dated table of assets awaiting a tier
//!
//! Every file is read whole and written whole. Nothing is written when a
//! read fails.

mod addendum;
mod document;
mod error;
mod layout;
mod record;

pub use addendum::UntieredAddendum;
pub use document::{
    document_link_base, load_document, parse_document, render_document, save_document,
    tier_columns, DEFAULT_DOCUMENT_BASE,
};
pub use error::{StoreError, StoreResult};
pub use layout::{CatalogueLayout, CONFIG_FILE_NAME, DOCUMENT_FILE_NAME};
pub use record::{load_record, parse_record, render_record, save_record};
