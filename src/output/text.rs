//! Plain-text report of harvested records

use crate::harvest::PageHarvest;
use crate::output::summarize;
use std::fmt::Write;

/// Renders a human-readable report of all pages and their records
pub fn render_report(pages: &[PageHarvest]) -> String {
    let mut out = String::new();

    for page in pages {
        let _ = writeln!(out, "=== {} ===", page.url);
        match &page.outcome {
            Ok(records) if records.is_empty() => {
                let _ = writeln!(out, "  (no videos found)");
            }
            Ok(records) => {
                for record in records {
                    let _ = writeln!(out, "Video: {}", record.video_url);
                    let _ = writeln!(out, "Thumbnail: {}", record.thumbnail);
                    let _ = writeln!(out, "Caption: {}", record.caption);
                    let _ = writeln!(out, "Author: {}", record.author);
                    if !record.post_url.is_empty() {
                        let _ = writeln!(out, "Post: {}", record.post_url);
                    }
                    if record.is_reel {
                        let _ = writeln!(out, "Reel: yes");
                    }
                    if let Some(timestamp) = record.timestamp {
                        let _ = writeln!(out, "Posted: {}", timestamp.to_rfc3339());
                    }
                    let _ = writeln!(out, "---");
                }
            }
            Err(e) => {
                let _ = writeln!(out, "  Error: {}", e);
            }
        }
        out.push('\n');
    }

    let summary = summarize(pages);
    let _ = writeln!(
        out,
        "Harvested {} / {} pages, {} videos ({} reels)",
        summary.harvested_pages, summary.total_pages, summary.total_records, summary.reels
    );

    out
}

/// Prints the report to stdout
pub fn print_report(pages: &[PageHarvest]) {
    print!("{}", render_report(pages));
}
