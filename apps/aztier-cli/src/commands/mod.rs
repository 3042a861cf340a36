//! CLI command implementations
//!
//! Each command exposes `execute`, which wires the real Azure connector, and
//! `run`, which takes the provider as a parameter.

pub mod json_to_md;
pub mod md_to_json;
pub mod sync;
pub mod watch;
