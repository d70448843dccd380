//! Per-release early-stop evaluation
//!
//! The listing is assumed reverse-chronological: once one complete release's
//! documents are all already known, nothing further back can be new and the
//! whole crawl stops. The evaluator is created fresh per release and fed
//! every document outcome, so the decision is always made on a complete
//! release rather than on a running counter shared across components.

/// Classification of one processed document against the crawl cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocOutcome {
    /// Release date known and ≤ the cursor; already covered by a prior run
    Old,
    /// Newer than the cursor, or date unknown/not comparable; might be new
    Fresh,
}

/// Classifies a document's normalized release date against the cursor
///
/// Conservative by design: an empty (unparseable) date or an absent cursor
/// is always `Fresh`: "might be new" never stops the crawl.
pub fn classify(release_date: &str, cursor: Option<&str>) -> DocOutcome {
    match cursor {
        Some(cursor) if !release_date.is_empty() && release_date <= cursor => DocOutcome::Old,
        _ => DocOutcome::Fresh,
    }
}

/// Collects the outcomes of one release's documents and decides whether the
/// crawl should stop after this release
#[derive(Debug, Default)]
pub struct EarlyStopEvaluator {
    documents: usize,
    old: usize,
}

impl EarlyStopEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: DocOutcome) {
        self.documents += 1;
        if outcome == DocOutcome::Old {
            self.old += 1;
        }
    }

    /// True iff the release had at least one document and every one was old
    ///
    /// A release that contributed zero documents never triggers the stop.
    pub fn release_exhausted(&self) -> bool {
        self.documents > 0 && self.old == self.documents
    }
}
