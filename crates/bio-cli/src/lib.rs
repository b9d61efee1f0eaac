//! Bio CLI - Pipeline driver and JSON dumps
//!
//! Wires the parser, normalizer, extractor, and graph crates into one
//! page-at-a-time pipeline producing a [`Profile`].

pub mod output;
pub mod pipeline;

pub use output::{dump_name, write_dump};
pub use pipeline::{Pipeline, Profile};
