//! Output module for presenting harvest results
//!
//! This module handles:
//! - Summarizing a harvest run
//! - Rendering records as human-readable text
//! - Rendering records as JSON lines

mod json;
pub mod text;

pub use json::render_json_lines;
pub use text::{print_report, render_report};

use crate::harvest::PageHarvest;

/// Counts over a finished harvest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    /// Pages requested
    pub total_pages: usize,

    /// Pages fetched and parsed
    pub harvested_pages: usize,

    /// Pages that failed at any stage
    pub failed_pages: usize,

    /// Records across all harvested pages
    pub total_records: usize,

    /// Records flagged as reels
    pub reels: usize,
}

impl HarvestSummary {
    /// Returns true if no page could be harvested
    pub fn all_failed(&self) -> bool {
        self.total_pages > 0 && self.harvested_pages == 0
    }
}

/// Summarizes a list of page results
pub fn summarize(pages: &[PageHarvest]) -> HarvestSummary {
    let mut summary = HarvestSummary {
        total_pages: pages.len(),
        ..HarvestSummary::default()
    };

    for page in pages {
        match &page.outcome {
            Ok(records) => {
                summary.harvested_pages += 1;
                summary.total_records += records.len();
                summary.reels += records.iter().filter(|r| r.is_reel).count();
            }
            Err(_) => summary.failed_pages += 1,
        }
    }

    summary
}
