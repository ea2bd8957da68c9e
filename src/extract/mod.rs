//! Media extraction from fetched pages
//!
//! The fetch core only hands raw page text to an [`Extractor`] and gets back
//! media records or an error. The default implementation reads the
//! `window._sharedData` JSON blob embedded in the page.

mod shared_data;

pub use shared_data::{SharedDataExtractor, SHARED_DATA_MARKER};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while extracting media records
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No embedded data block found in page")]
    NoDataBlock,

    #[error("Malformed embedded data block: {0}")]
    MalformedBlock(String),

    #[error("Invalid JSON in embedded data block: {0}")]
    Json(#[from] serde_json::Error),
}

/// A video post found in a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaRecord {
    /// Link to the post itself (empty if the page does not give a shortcode)
    pub post_url: String,

    /// Direct link to the video file
    pub video_url: String,

    /// Preview image
    pub thumbnail: String,

    /// First caption text, if any
    pub caption: String,

    /// Username of the poster
    pub author: String,

    /// Whether the post is a reel rather than a regular video post
    pub is_reel: bool,

    /// When the post was published
    pub timestamp: Option<DateTime<Utc>>,
}

/// Turns raw page text into media records
///
/// Implementations must be shareable across concurrent fetches.
pub trait Extractor: Send + Sync {
    /// Extracts every media record from the page
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<MediaRecord>)` - Records found (possibly none)
    /// * `Err(ExtractError)` - The page has no parseable data block
    fn extract(&self, html: &str) -> Result<Vec<MediaRecord>, ExtractError>;
}
