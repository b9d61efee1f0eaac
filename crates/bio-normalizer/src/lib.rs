//! Bio Normalizer - Text and infobox normalization
//!
//! Provides the pure normalization layer of the pipeline:
//! - Unicode (NFKC), width, and whitespace normalization of article text
//! - Japanese era conversion and date parsing
//! - Birthplace splitting and field standardization
//! - Multi-entry infobox cells (periods, children, awards)
//! - Synonym resolution of infobox labels into a typed record
//!
//! Nothing in this crate fails: unparseable input maps to the `不明` sentinel.

pub mod date;
pub mod entries;
pub mod infobox;
pub mod names;
pub mod place;
pub mod text;

pub use date::{
    age_at_death, convert_era_to_gregorian, find_era_date, normalize_date, parse_date, EraMatch,
};
pub use entries::handle_missing_value;
pub use infobox::{normalize_infobox, resolve_key};
pub use names::{extract_japanese_name, extract_parents, split_name_header, Parents};
pub use place::{parse_birthplace, standardize_field, standardize_location};
pub use text::TextNormalizer;
