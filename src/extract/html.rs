//! Structural extraction from HTML pages
//!
//! Each field is pulled by an ordered strategy list; the first strategy that
//! produces a non-empty candidate wins. Structural selectors come first,
//! with regex/text scans as fallbacks for pages where the expected markup
//! is missing or mangled.

use crate::extract::{
    dedup_preserving_order, is_renderable, normalize_date, normalize_vis_ref, vis_ref_pattern,
    ExtractedDoc,
};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// Path segments that mark a release-related document link
const DOC_PATH_SEGMENTS: &[&str] = &["/bulletins/", "/articles/"];

/// Extensions that mark a link target as a non-HTML asset
const ASSET_EXTENSIONS: &[&str] = &[".pdf", ".xls", ".xlsx", ".csv", ".zip"];

/// Extracts all fields from an HTML page body
pub fn extract_from_html(body: &str, base: &Url) -> ExtractedDoc {
    let document = Html::parse_document(body);

    ExtractedDoc {
        title: extract_title(&document),
        summary: extract_summary(&document),
        release_date: extract_release_date(&document),
        related_docs: extract_related_docs(&document, base),
        vis_refs: extract_vis_refs(&document, body, base),
    }
}

/// Title: primary heading, then document-level title metadata, then empty
fn extract_title(document: &Html) -> String {
    for selector in ["h1", "title"] {
        if let Some(text) = select_text(document, selector) {
            return text;
        }
    }
    String::new()
}

/// Summary: the description meta tag, if any
fn extract_summary(document: &Html) -> String {
    select_attr(document, r#"meta[name="description"]"#, "content").unwrap_or_default()
}

/// Release date, by marker priority:
///
/// 1. structured metadata field (meta tag)
/// 2. embedded structured-data block (JSON-LD `datePublished`)
/// 3. visible "Release date" label in the page text
///
/// The first marker that yields a candidate wins; normalization of an
/// unparseable candidate still produces the empty string.
fn extract_release_date(document: &Html) -> String {
    let candidate = date_from_meta(document)
        .or_else(|| date_from_json_ld(document))
        .or_else(|| date_from_visible_label(document));

    match candidate {
        Some(raw) => normalize_date(&raw),
        None => String::new(),
    }
}

fn date_from_meta(document: &Html) -> Option<String> {
    for selector in [
        r#"meta[name="release-date"]"#,
        r#"meta[property="article:published_time"]"#,
    ] {
        if let Some(content) = select_attr(document, selector, "content") {
            return Some(content);
        }
    }
    None
}

fn date_from_json_ld(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;
    for element in document.select(&selector) {
        let raw = element.text().collect::<String>();
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) else {
            continue;
        };
        if let Some(date) = value.get("datePublished").and_then(|v| v.as_str()) {
            return Some(date.to_string());
        }
    }
    None
}

fn date_from_visible_label(document: &Html) -> Option<String> {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    let pattern = LABEL.get_or_init(|| {
        Regex::new(
            r"(?i)release date:?\s*([0-9]{1,2} [A-Za-z]+ [0-9]{4}|[0-9]{1,2}/[0-9]{1,2}/[0-9]{2,4}|[0-9]{4}-[0-9]{2}-[0-9]{2})",
        )
        .expect("static pattern compiles")
    });

    let text = document.root_element().text().collect::<String>();
    pattern
        .captures(&text)
        .map(|captures| captures[1].to_string())
}

/// Related-document links: anchors whose target path looks like a bulletin
/// or article and is not a non-HTML asset
///
/// Links inside the designated related-content container are preferred; the
/// whole page is scanned only if that container yields nothing.
fn extract_related_docs(document: &Html, base: &Url) -> Vec<String> {
    for selector in ["#related-content a[href]", "a[href]"] {
        let links = collect_doc_links(document, selector, base);
        if !links.is_empty() {
            return links;
        }
    }
    Vec::new()
}

fn collect_doc_links(document: &Html, selector: &str, base: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href.trim()) else {
            continue;
        };
        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }
        let path = resolved.path();
        if !DOC_PATH_SEGMENTS.iter().any(|seg| path.contains(seg)) {
            continue;
        }
        if ASSET_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            continue;
        }
        links.push(resolved.to_string());
    }
    dedup_preserving_order(links)
}

/// Visualization references: embed elements carrying the asset path, with a
/// whole-page textual pattern scan as the fallback
fn extract_vis_refs(document: &Html, body: &str, base: &Url) -> Vec<String> {
    let mut refs = Vec::new();

    if let Ok(selector) = Selector::parse("iframe[src]") {
        for element in document.select(&selector) {
            if let Some(src) = element.value().attr("src") {
                if src.contains("/visualisations/") {
                    refs.push(src.to_string());
                }
            }
        }
    }

    if refs.is_empty() {
        for found in vis_ref_pattern().find_iter(body) {
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

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn select_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://stats.example.org/").unwrap()
    }

    fn extract(body: &str) -> ExtractedDoc {
        extract_from_html(body, &base())
    }

    #[test]
    fn test_title_prefers_heading() {
        let doc = extract(
            r#"<html><head><title>Meta Title</title></head>
               <body><h1>Heading Title</h1></body></html>"#,
        );
        assert_eq!(doc.title, "Heading Title");
    }

    #[test]
    fn test_title_falls_back_to_title_tag() {
        let doc = extract(r#"<html><head><title>Meta Title</title></head><body></body></html>"#);
        assert_eq!(doc.title, "Meta Title");
    }

    #[test]
    fn test_title_empty_when_absent() {
        let doc = extract("<html><body><p>no headings here</p></body></html>");
        assert_eq!(doc.title, "");
    }

    #[test]
    fn test_date_from_meta_tag() {
        let doc = extract(
            r#"<html><head><meta name="release-date" content="2024-01-10T09:30:00Z"></head>
               <body><p>Release date: 12 March 2020</p></body></html>"#,
        );
        assert_eq!(doc.release_date, "2024-01-10");
    }

    #[test]
    fn test_date_from_json_ld_when_no_meta() {
        let doc = extract(
            r#"<html><head>
               <script type="application/ld+json">{"@type":"Article","datePublished":"2024-02-05T07:00:00"}</script>
               </head><body></body></html>"#,
        );
        assert_eq!(doc.release_date, "2024-02-05");
    }

    #[test]
    fn test_date_from_visible_label_last() {
        let doc = extract(
            r#"<html><body><dl><dt>Release date:</dt><dd>10 January 2024</dd></dl></body></html>"#,
        );
        assert_eq!(doc.release_date, "2024-01-10");
    }

    #[test]
    fn test_unparseable_date_is_empty() {
        let doc = extract(
            r#"<html><head><meta name="release-date" content="whenever"></head><body></body></html>"#,
        );
        assert_eq!(doc.release_date, "");
    }

    #[test]
    fn test_related_docs_prefer_container() {
        let doc = extract(
            r#"<html><body>
               <a href="/economy/articles/outside/2024-01-10">Outside</a>
               <div id="related-content">
                 <a href="/economy/bulletins/gdp/january2024">GDP</a>
               </div>
               </body></html>"#,
        );
        assert_eq!(
            doc.related_docs,
            vec!["https://stats.example.org/economy/bulletins/gdp/january2024"]
        );
    }

    #[test]
    fn test_related_docs_fall_back_to_whole_page() {
        let doc = extract(
            r#"<html><body>
               <div id="related-content"><a href="/about">Not a doc</a></div>
               <a href="/economy/articles/trade/2024-01-10">Trade</a>
               </body></html>"#,
        );
        assert_eq!(
            doc.related_docs,
            vec!["https://stats.example.org/economy/articles/trade/2024-01-10"]
        );
    }

    #[test]
    fn test_related_docs_skip_assets_and_dedup() {
        let doc = extract(
            r#"<html><body>
               <a href="/economy/bulletins/gdp/january2024">GDP</a>
               <a href="/economy/bulletins/gdp/january2024">GDP again</a>
               <a href="/economy/bulletins/gdp/january2024/data.pdf">PDF</a>
               </body></html>"#,
        );
        assert_eq!(
            doc.related_docs,
            vec!["https://stats.example.org/economy/bulletins/gdp/january2024"]
        );
    }

    #[test]
    fn test_vis_refs_from_iframe() {
        let doc = extract(
            r#"<html><body>
               <iframe src="https://stats.example.org/visualisations/dvc42/linechart/index.html"></iframe>
               </body></html>"#,
        );
        assert_eq!(doc.vis_refs, vec!["/visualisations/dvc42/linechart/index.html"]);
    }

    #[test]
    fn test_vis_refs_regex_fallback_without_iframe() {
        let doc = extract(
            r#"<html><body>
               <p>See the chart at /visualisations/dvc42/linechart/index.html for details.</p>
               </body></html>"#,
        );
        assert_eq!(doc.vis_refs, vec!["/visualisations/dvc42/linechart/index.html"]);
    }

    #[test]
    fn test_vis_refs_exclude_spreadsheets() {
        let doc = extract(
            r#"<html><body>
               <p>/visualisations/dvc42/data.xlsx and /visualisations/dvc42/chart</p>
               </body></html>"#,
        );
        assert_eq!(doc.vis_refs, vec!["/visualisations/dvc42/chart"]);
    }

    #[test]
    fn test_vis_refs_dedup() {
        let doc = extract(
            r#"<html><body>
               <iframe src="/visualisations/dvc42/chart"></iframe>
               <iframe src="/visualisations/dvc42/chart"></iframe>
               </body></html>"#,
        );
        assert_eq!(doc.vis_refs.len(), 1);
    }
}
