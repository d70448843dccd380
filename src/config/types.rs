use serde::Deserialize;

/// Main configuration structure for Relsnap
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub capture: CaptureConfig,
    pub state: StateConfig,
}

/// Source-site configuration
///
/// The crawl has exactly one site's conventions baked in; these fields only
/// locate that site, they do not generalize the extraction rules.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the publishing site (e.g. "https://www.ons.gov.uk")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the paginated release-listing endpoint (returns JSON)
    #[serde(rename = "listing-path")]
    pub listing_path: String,

    /// Number of release summaries requested per listing page
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Maximum number of listing pages to walk before giving up
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Suffix appended to release/document URLs to get the machine-readable
    /// page-data variant (e.g. "/data"); empty string fetches plain HTML
    #[serde(rename = "page-data-suffix", default)]
    pub page_data_suffix: String,
}

/// Fetch politeness and retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Delay before every request (milliseconds)
    #[serde(rename = "base-delay-ms")]
    pub base_delay_ms: u64,

    /// Upper bound of the random jitter added to the base delay (milliseconds)
    #[serde(rename = "jitter-ms")]
    pub jitter_ms: u64,

    /// Maximum fetch attempts per URL before returning a failure signal
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Fixed floor added to every retry backoff (seconds); the backoff for
    /// attempt n is n² + floor
    #[serde(rename = "backoff-floor-secs")]
    pub backoff_floor_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the identifying user-agent string sent with every request and
    /// passed to the render tool: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Screenshot capture configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    /// Directory screenshots are written to, numbered by assignment index
    #[serde(rename = "screenshot-dir")]
    pub screenshot_dir: String,

    /// External render tool executable (e.g. "shot-scraper")
    pub command: String,

    /// Browser engine the fallback backend renders with
    #[serde(rename = "fallback-browser")]
    pub fallback_browser: String,

    /// Substring of the tool's stderr that marks a renderer incompatibility
    /// and triggers the one fallback attempt
    #[serde(rename = "incompatibility-marker")]
    pub incompatibility_marker: String,

    /// Fixed render viewport width (pixels)
    pub width: u32,

    /// Settle wait before the capture is taken (milliseconds)
    #[serde(rename = "wait-ms")]
    pub wait_ms: u64,

    /// JPEG/PNG quality parameter passed to the tool
    pub quality: u32,

    /// Pause after processing a document that yielded visualizations
    /// (seconds); additional politeness proportional to render load
    #[serde(rename = "post-capture-pause-secs")]
    pub post_capture_pause_secs: u64,
}

/// Persisted-state file locations
#[derive(Debug, Clone, Deserialize)]
pub struct StateConfig {
    /// Path of the Document Record sequence (JSON array)
    #[serde(rename = "results-path")]
    pub results_path: String,

    /// Path of the visualization-reference → filename-index map (JSON object)
    #[serde(rename = "assignments-path")]
    pub assignments_path: String,
}
