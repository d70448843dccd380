//! Screenshot capture via an external render tool
//!
//! Each newly-seen visualization reference is rendered exactly once, to an
//! image file named by its assignment index. All subprocess failures are
//! contained here and converted to a failure result; nothing in this module
//! aborts the run.

mod backend;

pub use backend::{classify_output, RenderBackend, RenderOutcome};

use crate::config::CaptureConfig;
use std::future::Future;
use std::path::PathBuf;
use url::Url;

/// One render-tool invocation target
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Absolute URL of the visualization
    pub target_url: String,
    /// Where the image file is written
    pub output_path: PathBuf,
    /// Identifying user-agent string passed to the tool
    pub user_agent: String,
}

/// Result of capturing one visualization reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureResult {
    /// The screenshot file was written
    Captured,
    /// Terminal for this run; the reference stays unassigned and will be
    /// attempted again on the next run
    Failed,
}

/// Seam between the orchestrator and the render tool
///
/// The production implementation shells out to the configured tool; tests
/// drive the orchestrator with a recording fake.
pub trait Capturer {
    /// Renders `vis_ref` to the image file numbered `index`
    fn capture(&self, index: u64, vis_ref: &str) -> impl Future<Output = CaptureResult> + Send;
}

/// Capturer backed by the configured external render tool
pub struct CommandCapturer {
    config: CaptureConfig,
    base: Url,
    user_agent: String,
}

impl CommandCapturer {
    /// Creates the capturer and its screenshot directory
    pub fn new(config: CaptureConfig, base: Url, user_agent: String) -> std::io::Result<Self> {
        std::fs::create_dir_all(&config.screenshot_dir)?;
        Ok(Self {
            config,
            base,
            user_agent,
        })
    }

    fn request_for(&self, index: u64, vis_ref: &str) -> RenderRequest {
        let target_url = if vis_ref.starts_with("http://") || vis_ref.starts_with("https://") {
            vis_ref.to_string()
        } else {
            self.base
                .join(vis_ref)
                .map(|url| url.to_string())
                .unwrap_or_else(|_| format!("{}{}", self.base, vis_ref))
        };

        RenderRequest {
            target_url,
            output_path: PathBuf::from(&self.config.screenshot_dir).join(format!("{}.png", index)),
            user_agent: self.user_agent.clone(),
        }
    }

    async fn run_backend(&self, backend: RenderBackend, request: &RenderRequest) -> RenderOutcome {
        let mut command = backend.command(&self.config, request);
        match command.output().await {
            Ok(output) => classify_output(&output, &self.config.incompatibility_marker),
            Err(e) => RenderOutcome::Failed {
                reason: format!("failed to run {}: {}", self.config.command, e),
            },
        }
    }
}

impl Capturer for CommandCapturer {
    async fn capture(&self, index: u64, vis_ref: &str) -> CaptureResult {
        let request = self.request_for(index, vis_ref);
        tracing::info!("Capturing {} -> {}", vis_ref, request.output_path.display());

        match self.run_backend(RenderBackend::Primary, &request).await {
            RenderOutcome::Success => CaptureResult::Captured,
            RenderOutcome::Incompatible { stderr } => {
                tracing::warn!(
                    "Primary renderer incompatible with {}, retrying on fallback: {}",
                    vis_ref,
                    stderr.trim()
                );
                match self.run_backend(RenderBackend::Fallback, &request).await {
                    RenderOutcome::Success => CaptureResult::Captured,
                    RenderOutcome::Incompatible { stderr }
                    | RenderOutcome::Failed { reason: stderr } => {
                        tracing::warn!("Fallback renderer failed for {}: {}", vis_ref, stderr);
                        CaptureResult::Failed
                    }
                }
            }
            RenderOutcome::Failed { reason } => {
                tracing::warn!("Render failed for {}: {}", vis_ref, reason);
                CaptureResult::Failed
            }
        }
    }
}
