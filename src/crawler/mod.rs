//! Crawler module: fetching, early-stop evaluation, and orchestration
//!
//! Control flow: the coordinator paginates the release listing, fetches and
//! extracts each release page, then each release-related document, and hands
//! newly-seen visualization references to the capturer. The early-stop
//! evaluator bounds the crawl on steady-state (already-seen) data.

mod coordinator;
mod early_stop;
mod fetcher;

pub use coordinator::{Coordinator, RunSummary};
pub use early_stop::{classify, DocOutcome, EarlyStopEvaluator};
pub use fetcher::{FetchResult, Fetcher};

use crate::capture::CommandCapturer;
use crate::config::Config;
use crate::store::StateStore;
use crate::Result;
use url::Url;

/// Runs a complete crawl with the production capturer
///
/// 1. Loads the persisted state (fatal if absent; seed with `--init`)
/// 2. Builds the external-tool capturer
/// 3. Walks the release listing until done, the page ceiling, or early stop
/// 4. Persists results and assignments
pub async fn crawl(config: Config) -> Result<RunSummary> {
    let store = StateStore::load(&config.state)?;
    tracing::info!(
        "Loaded state: {} document records, {} screenshot assignments",
        store.record_count(),
        store.assignment_count()
    );

    let base = Url::parse(&config.site.base_url)?;
    let capturer = CommandCapturer::new(
        config.capture.clone(),
        base,
        config.user_agent.header_value(),
    )?;

    let coordinator = Coordinator::new(config, capturer, store)?;
    coordinator.run().await
}
