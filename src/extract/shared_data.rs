//! Extractor for the `window._sharedData` blob
//!
//! Pages embed their initial state as
//! `<script>window._sharedData = {...};</script>`. The blob is cut out of the
//! script, decoded as JSON, and every object carrying a `video_url` becomes a
//! record.

use crate::extract::{ExtractError, Extractor, MediaRecord};
use chrono::{TimeZone, Utc};
use scraper::{Html, Selector};
use serde_json::{Map, Value};

/// Text identifying the script that holds the data blob
pub const SHARED_DATA_MARKER: &str = "window._sharedData";

const SITE_BASE: &str = "https://www.instagram.com";

/// Default [`Extractor`] reading `window._sharedData`
#[derive(Debug, Clone, Default)]
pub struct SharedDataExtractor;

impl SharedDataExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for SharedDataExtractor {
    fn extract(&self, html: &str) -> Result<Vec<MediaRecord>, ExtractError> {
        let script = find_data_script(html).ok_or(ExtractError::NoDataBlock)?;
        let blob = cut_json_blob(&script)?;
        let data: Value = serde_json::from_str(blob)?;

        let mut records = Vec::new();
        collect_videos(&data, &mut records);

        tracing::info!("{} videos extracted", records.len());
        Ok(records)
    }
}

/// Returns the text of the first script mentioning the data marker
fn find_data_script(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script").ok()?;

    document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .find(|text| text.contains(SHARED_DATA_MARKER))
}

/// Cuts the JSON object out of `window._sharedData = {...};`
///
/// The object runs from the first `{` to the last `};`.
fn cut_json_blob(script: &str) -> Result<&str, ExtractError> {
    let start = script.find('{');
    let end = script.rfind("};");

    match (start, end) {
        (Some(start), Some(end)) if start <= end => Ok(&script[start..=end]),
        _ => Err(ExtractError::MalformedBlock(
            "expected a JSON object terminated by '};'".to_string(),
        )),
    }
}

/// Walks the JSON tree depth-first, recording every video node
///
/// A video node's children are not searched further.
fn collect_videos(value: &Value, records: &mut Vec<MediaRecord>) {
    match value {
        Value::Object(node) => {
            if let Some(record) = video_record(node) {
                records.push(record);
                return;
            }
            for child in node.values() {
                collect_videos(child, records);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_videos(item, records);
            }
        }
        _ => {}
    }
}

/// Builds a record from a node that has a `video_url`
fn video_record(node: &Map<String, Value>) -> Option<MediaRecord> {
    let video_url = node.get("video_url")?.as_str()?.to_string();

    let text_at = |pointer: &str| {
        node_pointer(node, pointer)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let is_reel = node.get("product_type").and_then(Value::as_str) == Some("clips");

    let post_url = match node.get("shortcode").and_then(Value::as_str) {
        Some(code) if is_reel => format!("{}/reel/{}/", SITE_BASE, code),
        Some(code) => format!("{}/p/{}/", SITE_BASE, code),
        None => String::new(),
    };

    let thumbnail = match text_at("/display_url") {
        url if url.is_empty() => text_at("/thumbnail_src"),
        url => url,
    };

    let timestamp = node
        .get("taken_at_timestamp")
        .and_then(Value::as_i64)
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single());

    Some(MediaRecord {
        post_url,
        video_url,
        thumbnail,
        caption: text_at("/edge_media_to_caption/edges/0/node/text"),
        author: text_at("/owner/username"),
        is_reel,
        timestamp,
    })
}

/// JSON pointer lookup relative to an object node
fn node_pointer<'a>(node: &'a Map<String, Value>, pointer: &str) -> Option<&'a Value> {
    let mut segments = pointer.trim_start_matches('/').split('/');
    let first = node.get(segments.next()?)?;
    segments.try_fold(first, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}
