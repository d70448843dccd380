//! Best-effort extraction from fetched pages
//!
//! The extractor is a pure function of already-fetched text; it never
//! performs I/O. Each field is pulled with an ordered list of strategies,
//! tried until one yields a non-empty result, so the fallback priority is
//! explicit rather than implicit in code order.
//!
//! Two page shapes exist in the wild: plain HTML, and the machine-readable
//! JSON "page data" variant served by earlier versions of the source site's
//! API. A body that parses as a page-data object takes the JSON path;
//! everything else goes through the HTML path.

mod date;
mod html;
mod json;

pub use date::normalize_date;
pub use json::parse_listing;

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Path markers that identify a visualization reference pointing at a
/// non-renderable asset (documents, spreadsheets, vector images)
const NON_RENDERABLE_MARKERS: &[&str] = &[".xls", ".pdf", ".doc", ".ppt", ".csv", ".svg"];

/// Everything extracted from one fetched page, all fields best-effort
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedDoc {
    /// Page title; empty if no heading or title metadata was found
    pub title: String,

    /// Summary text; empty when the page carries none
    pub summary: String,

    /// Normalized `YYYY-MM-DD` release date, or empty if unknown
    pub release_date: String,

    /// Related-document URLs, deduplicated in first-seen order
    pub related_docs: Vec<String>,

    /// Visualization references, deduplicated in first-seen order
    pub vis_refs: Vec<String>,
}

/// Extracts title, release date, related documents and visualization
/// references from a fetched page body
pub fn extract_document(body: &str, base: &Url) -> ExtractedDoc {
    if let Some(doc) = json::extract_from_page_data(body, base) {
        doc
    } else {
        html::extract_from_html(body, base)
    }
}

/// The textual fallback pattern for visualization asset paths
pub(crate) fn vis_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"/visualisations/dvc[^"'\s<>\\]*"#).expect("static pattern compiles")
    })
}

/// Returns true if the reference points at something a browser can render
pub(crate) fn is_renderable(reference: &str) -> bool {
    !NON_RENDERABLE_MARKERS
        .iter()
        .any(|marker| reference.contains(marker))
}

/// Normalizes a visualization reference to its site-relative path form
///
/// Equality between references is exact string equality after this step, so
/// an absolute URL and its relative form must collapse to the same key.
pub(crate) fn normalize_vis_ref(raw: &str, base: &Url) -> Option<String> {
    // Trailing sentence punctuation picked up by the textual pattern scan
    let raw = raw.trim().trim_end_matches(['"', '\'', ')', ',', '.']);
    if raw.is_empty() {
        return None;
    }

    if raw.starts_with("http://") || raw.starts_with("https://") {
        let parsed = Url::parse(raw).ok()?;
        if parsed.host_str() == base.host_str() {
            return Some(parsed.path().to_string());
        }
        // Off-site embeds keep their full URL as the reference key
        return Some(raw.to_string());
    }

    if raw.starts_with('/') {
        return Some(raw.to_string());
    }

    None
}

/// Deduplicates while preserving first-seen order
pub(crate) fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
