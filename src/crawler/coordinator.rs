//! Crawl orchestration
//!
//! Drives pagination across the release-listing endpoint, walks each
//! release's related documents, classifies every document against the crawl
//! cursor, captures any unassigned visualizations, and applies the
//! early-termination rule on complete releases. State is persisted after
//! every listing page so a crash mid-run loses at most one page of work,
//! and again on any exit path.

use crate::capture::{Capturer, CaptureResult};
use crate::config::Config;
use crate::crawler::early_stop::{classify, DocOutcome, EarlyStopEvaluator};
use crate::crawler::fetcher::Fetcher;
use crate::extract::{extract_document, parse_listing};
use crate::store::{DocumentRecord, StateStore};
use crate::Result;
use std::time::Duration;
use url::Url;

/// What a finished run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Listing pages walked (including skipped ones)
    pub pages_walked: u32,
    /// Fresh documents recorded this run
    pub documents_recorded: u64,
    /// Screenshots captured (= new assignments) this run
    pub screenshots_captured: u64,
    /// True when the early-termination rule ended the crawl
    pub early_stopped: bool,
}

/// Sequential crawl orchestrator
///
/// Owns the results sequence and the crawl cursor for the run; the state
/// store is the sole writer of the persisted files. Everything runs on one
/// logical thread: early termination must see complete releases, and the
/// politeness constraints favor strict sequencing anyway.
pub struct Coordinator<C: Capturer> {
    config: Config,
    base: Url,
    fetcher: Fetcher,
    capturer: C,
    store: StateStore,
    cursor: Option<String>,
    summary: RunSummary,
}

impl<C: Capturer> Coordinator<C> {
    /// Creates a coordinator over an already-loaded state store
    ///
    /// The crawl cursor is computed here, once, from the previous runs'
    /// records; documents recorded during this run never move it.
    pub fn new(config: Config, capturer: C, store: StateStore) -> Result<Self> {
        let base = Url::parse(&config.site.base_url)?;
        let fetcher = Fetcher::new(config.fetch.clone(), &config.user_agent)?;
        let cursor = store.cursor();

        match &cursor {
            Some(date) => tracing::info!("Crawl cursor from previous runs: {}", date),
            None => tracing::info!("No crawl cursor; every document is fresh"),
        }

        Ok(Self {
            config,
            base,
            fetcher,
            capturer,
            store,
            cursor,
            summary: RunSummary::default(),
        })
    }

    /// Runs the crawl to completion, the page ceiling, or the early stop
    ///
    /// Always persists whatever was accumulated before returning, even on
    /// the early-stop path.
    pub async fn run(mut self) -> Result<RunSummary> {
        for page in 1..=self.config.site.max_pages {
            self.summary.pages_walked = page;
            tracing::info!("==== Listing page {}/{} ====", page, self.config.site.max_pages);

            if self.walk_listing_page(page).await? {
                self.summary.early_stopped = true;
                tracing::info!(
                    "Early stop: a complete release was already covered by a previous run"
                );
                break;
            }

            // Persist after every page so a crash loses at most one page
            self.store.save()?;
        }

        self.store.save()?;
        tracing::info!(
            "Run finished: {} pages, {} documents, {} screenshots{}",
            self.summary.pages_walked,
            self.summary.documents_recorded,
            self.summary.screenshots_captured,
            if self.summary.early_stopped {
                " (early stop)"
            } else {
                ""
            }
        );
        Ok(self.summary)
    }

    /// Walks one listing page; returns true when the early stop fired
    async fn walk_listing_page(&mut self, page: u32) -> Result<bool> {
        let listing_url = self.listing_url(page)?;

        let Some(body) = self.fetcher.fetch(listing_url.as_str()).await.body() else {
            tracing::warn!("Skipping listing page {}: fetch failed", page);
            return Ok(false);
        };

        let Some(release_uris) = parse_listing(&body) else {
            tracing::warn!("Skipping listing page {}: unparseable response", page);
            return Ok(false);
        };

        tracing::info!("Listing page {} has {} releases", page, release_uris.len());

        for uri in release_uris {
            if self.walk_release(&uri).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Processes one release; returns true when all its documents were old
    async fn walk_release(&mut self, uri: &str) -> Result<bool> {
        let Ok(release_url) = self.base.join(uri) else {
            tracing::warn!("Skipping release with malformed URI: {}", uri);
            return Ok(false);
        };

        let fetch_url = self.with_data_suffix(&release_url);
        let Some(body) = self.fetcher.fetch(&fetch_url).await.body() else {
            tracing::warn!("Skipping release {}: fetch failed", release_url);
            return Ok(false);
        };

        let release = extract_document(&body, &self.base);
        if release.related_docs.is_empty() {
            tracing::debug!("Release {} has no related documents", release_url);
            return Ok(false);
        }

        let mut evaluator = EarlyStopEvaluator::new();
        for doc_uri in &release.related_docs {
            if let Some(outcome) = self.process_document(doc_uri).await {
                evaluator.record(outcome);
            }
        }

        Ok(evaluator.release_exhausted())
    }

    /// Fetches, classifies and (if fresh) records one related document
    ///
    /// Returns None when the document could not be fetched; a failed fetch
    /// contributes nothing to the release's early-stop evaluation.
    async fn process_document(&mut self, doc_uri: &str) -> Option<DocOutcome> {
        let Ok(doc_url) = Url::parse(doc_uri) else {
            tracing::warn!("Skipping document with malformed URI: {}", doc_uri);
            return None;
        };

        let fetch_url = self.with_data_suffix(&doc_url);
        let Some(body) = self.fetcher.fetch(&fetch_url).await.body() else {
            tracing::warn!("Skipping document {}: fetch failed", doc_uri);
            return None;
        };

        let doc = extract_document(&body, &self.base);
        let outcome = classify(&doc.release_date, self.cursor.as_deref());

        if outcome == DocOutcome::Old {
            tracing::debug!(
                "{} already covered ({} <= cursor)",
                doc_uri,
                doc.release_date
            );
            return Some(DocOutcome::Old);
        }

        tracing::info!(
            "{} [{}] {} visualizations",
            doc.title,
            if doc.release_date.is_empty() {
                "no date"
            } else {
                &doc.release_date
            },
            doc.vis_refs.len()
        );

        for vis_ref in &doc.vis_refs {
            if self.store.is_assigned(vis_ref) {
                tracing::debug!("Already captured: {}", vis_ref);
                continue;
            }
            let index = self.store.next_index();
            match self.capturer.capture(index, vis_ref).await {
                CaptureResult::Captured => {
                    self.store.assign(vis_ref);
                    self.summary.screenshots_captured += 1;
                }
                CaptureResult::Failed => {
                    // Stays unassigned; the next run tries again
                    tracing::warn!("Capture failed for {}", vis_ref);
                }
            }
        }

        let had_visualizations = !doc.vis_refs.is_empty();
        self.store.push_record(DocumentRecord {
            title: doc.title,
            doc_uri: doc_url.to_string(),
            vis_refs: doc.vis_refs,
            summary: doc.summary,
            release_date: doc.release_date,
        });
        self.summary.documents_recorded += 1;

        if had_visualizations && self.config.capture.post_capture_pause_secs > 0 {
            // Extra politeness proportional to the load placed on the renderer
            tokio::time::sleep(Duration::from_secs(
                self.config.capture.post_capture_pause_secs,
            ))
            .await;
        }

        Some(DocOutcome::Fresh)
    }

    fn listing_url(&self, page: u32) -> Result<Url> {
        let mut url = self.base.join(&self.config.site.listing_path)?;
        url.set_query(Some(&format!(
            "size={}&page={}",
            self.config.site.page_size, page
        )));
        Ok(url)
    }

    /// Appends the page-data suffix used by the JSON protocol variant
    fn with_data_suffix(&self, url: &Url) -> String {
        format!("{}{}", url, self.config.site.page_data_suffix)
    }
}
