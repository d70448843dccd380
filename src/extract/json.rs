//! Extraction from the JSON "page data" protocol variant
//!
//! Earlier versions of the source site's API serve a machine-readable JSON
//! representation of each page (the `/data` suffix). Its shape is
//! best-effort-parseable, not a stable contract: every field access degrades
//! to empty rather than failing the document.

use crate::extract::{
    dedup_preserving_order, is_renderable, normalize_date, normalize_vis_ref, vis_ref_pattern,
    ExtractedDoc,
};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// One page of the release-listing endpoint
#[derive(Debug, Deserialize)]
struct ListingPage {
    result: ListingResult,
}

#[derive(Debug, Deserialize)]
struct ListingResult {
    results: Vec<ReleaseSummary>,
}

/// One release summary on a listing page; only the URI is needed
#[derive(Debug, Deserialize)]
struct ReleaseSummary {
    uri: String,
}

/// Parses a listing-endpoint response into release URIs, in listing order
///
/// Returns None when the body is not a listing page; callers treat that as
/// a skippable parse failure, not an abort.
pub fn parse_listing(body: &str) -> Option<Vec<String>> {
    let page: ListingPage = serde_json::from_str(body).ok()?;
    Some(
        page.result
            .results
            .into_iter()
            .map(|summary| summary.uri)
            .collect(),
    )
}

/// Extracts all fields from a page-data JSON body
///
/// Returns None when the body is not a page-data object, sending the caller
/// down the HTML path instead.
pub fn extract_from_page_data(body: &str, base: &Url) -> Option<ExtractedDoc> {
    let trimmed = body.trim_start();
    if !trimmed.starts_with('{') {
        return None;
    }
    let value: Value = serde_json::from_str(trimmed).ok()?;
    // A page-data object always carries a description block
    let description = value.get("description")?;

    let title = string_field(description, "title");
    let summary = string_field(description, "summary");
    let release_date = normalize_date(&string_field(description, "releaseDate"));
    let related_docs = related_docs(&value, base);
    let vis_refs = vis_refs_from_sections(&value, base);

    Some(ExtractedDoc {
        title,
        summary,
        release_date,
        related_docs,
        vis_refs,
    })
}

fn string_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Related documents listed by the page-data object, resolved to absolute URLs
fn related_docs(value: &Value, base: &Url) -> Vec<String> {
    let Some(entries) = value.get("relatedDocuments").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for entry in entries {
        let Some(uri) = entry.get("uri").and_then(|v| v.as_str()) else {
            continue;
        };
        if let Ok(resolved) = base.join(uri) {
            links.push(resolved.to_string());
        }
    }
    dedup_preserving_order(links)
}

/// Scans every section's markdown for visualization asset paths
fn vis_refs_from_sections(value: &Value, base: &Url) -> Vec<String> {
    let Some(sections) = value.get("sections").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    let mut refs = Vec::new();
    for section in sections {
        let Some(markdown) = section.get("markdown").and_then(|v| v.as_str()) else {
            continue;
        };
        for found in vis_ref_pattern().find_iter(markdown) {
            refs.push(found.as_str().to_string());
        }
    }

    let normalized = refs
        .into_iter()
        .filter_map(|raw| normalize_vis_ref(&raw, base))
        .filter(|reference| is_renderable(reference))
        .collect();
    dedup_preserving_order(normalized)
}
