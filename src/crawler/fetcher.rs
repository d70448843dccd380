//! HTTP fetcher with politeness delay and bounded retry
//!
//! Every request is preceded by a polite delay (base plus random jitter) so
//! the source site is never hammered. Any non-200 response or transport
//! error is retried up to the configured ceiling with a backoff that grows
//! quadratically in the attempt index plus a fixed floor: fast initial
//! retries, long waits for persistent failures, no unbounded tail.
//!
//! Exhausting all attempts yields a failure signal, never an error or a
//! panic; callers skip the unit of work and carry on.

use crate::config::{FetchConfig, UserAgentConfig};
use rand::Rng;
use reqwest::Client;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// The response body
    Body(String),
    /// All attempts exhausted; callers treat this as "could not fetch" and
    /// degrade gracefully
    Failed,
}

impl FetchResult {
    /// Returns the body if the fetch succeeded
    pub fn body(self) -> Option<String> {
        match self {
            FetchResult::Body(body) => Some(body),
            FetchResult::Failed => None,
        }
    }
}

/// Rate-limited, retrying HTTP fetcher
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    /// Builds the fetcher and its HTTP client
    pub fn new(config: FetchConfig, user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent.header_value())
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetches a URL, returning the body text or a failure signal
    pub async fn fetch(&self, url: &str) -> FetchResult {
        for attempt in 1..=self.config.max_attempts {
            self.polite_delay().await;

            match self.client.get(url).send().await {
                Ok(response) if response.status().as_u16() == 200 => {
                    match response.text().await {
                        Ok(body) => {
                            tracing::debug!("Fetched {} (attempt {})", url, attempt);
                            return FetchResult::Body(body);
                        }
                        Err(e) => {
                            tracing::warn!("Body read failed for {}: {}", url, e);
                        }
                    }
                }
                Ok(response) => {
                    tracing::warn!(
                        "HTTP {} for {} (attempt {}/{})",
                        response.status(),
                        url,
                        attempt,
                        self.config.max_attempts
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Request error for {} (attempt {}/{}): {}",
                        url,
                        attempt,
                        self.config.max_attempts,
                        e
                    );
                }
            }

            if attempt < self.config.max_attempts {
                tokio::time::sleep(backoff_delay(attempt, self.config.backoff_floor_secs)).await;
            }
        }

        tracing::warn!(
            "Giving up on {} after {} attempts",
            url,
            self.config.max_attempts
        );
        FetchResult::Failed
    }

    /// The pre-request politeness pause: base delay plus random jitter
    async fn polite_delay(&self) {
        let jitter = if self.config.jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.config.jitter_ms)
        } else {
            0
        };
        tokio::time::sleep(Duration::from_millis(self.config.base_delay_ms + jitter)).await;
    }
}

/// Backoff before retrying after failed attempt `attempt` (1-based):
/// `attempt² + floor` seconds
fn backoff_delay(attempt: u32, floor_secs: u64) -> Duration {
    Duration::from_secs(u64::from(attempt) * u64::from(attempt) + floor_secs)
}
