//! JSON lines output, one record per line

use crate::harvest::PageHarvest;
use serde::Serialize;

#[derive(Serialize)]
struct JsonLine<'a> {
    page: &'a str,
    #[serde(flatten)]
    record: &'a crate::extract::MediaRecord,
}

/// Renders every record of every harvested page as one JSON object per line
///
/// Failed pages are skipped; they are reported through logging.
pub fn render_json_lines(pages: &[PageHarvest]) -> Result<String, serde_json::Error> {
    let mut out = String::new();

    for page in pages {
        let Ok(records) = &page.outcome else {
            continue;
        };
        for record in records {
            out.push_str(&serde_json::to_string(&JsonLine {
                page: &page.url,
                record,
            })?);
            out.push('\n');
        }
    }

    Ok(out)
}
