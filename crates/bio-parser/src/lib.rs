//! Bio Parser - Wikipedia article HTML extraction
//!
//! Turns one fetched article into:
//! - Ordered, normalized sections with their heading paths
//! - The raw infobox key/value table
//! - Embedded images and the filtered category list
//!
//! Fetching is out of scope; callers hand in the HTML string they already
//! have. Everything here works on an immutable parsed document.

pub mod assets;
pub mod document;
pub mod infobox;
pub mod sections;

pub use assets::{extract_images, filter_categories};
pub use document::WikiPage;
pub use infobox::extract_infobox;
pub use sections::SectionExtractor;

use bio_core::BioError;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while loading an article
#[derive(Error, Debug)]
pub enum ParserError {
    /// Extraction was requested for a page whose HTML is missing or empty
    #[error("HTML content has not been fetched for page: {0}")]
    ContentNotFetched(String),

    /// IO error while reading a saved page
    #[error("IO error reading file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ParserError>;

impl From<ParserError> for BioError {
    fn from(err: ParserError) -> Self {
        match err {
            ParserError::ContentNotFetched(_) => BioError::content_not_fetched(),
            ParserError::IoError { source, .. } => BioError::Io(source),
        }
    }
}
