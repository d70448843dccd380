//! Relsnap: an incremental release-visualization snapshotter
//!
//! This crate crawls a statistical-publishing site's release calendar,
//! extracts embedded interactive-visualization references from each release's
//! related documents, and captures a rendered screenshot of every
//! newly-discovered visualization exactly once. Persisted state makes
//! repeated runs process only what is new since the last run.

pub mod capture;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod store;

use thiserror::Error;

/// Main error type for Relsnap operations
#[derive(Debug, Error)]
pub enum RelsnapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// State-store errors
///
/// Missing or corrupt state files at startup are fatal: without the prior
/// assignment ledger every visualization would look new and get re-captured.
/// Operators seed empty files explicitly (`relsnap --init <config>`).
#[derive(Debug, Error)]
pub enum StateError {
    #[error("State file missing: {path} (seed it explicitly with --init)")]
    Missing { path: String },

    #[error("Failed to read state file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse state file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Failed to write state file {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("State file already exists: {path} (refusing to overwrite)")]
    AlreadyExists { path: String },
}

/// Result type alias for Relsnap operations
pub type Result<T> = std::result::Result<T, RelsnapError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for state-store operations
pub type StateResult<T> = std::result::Result<T, StateError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::ExtractedDoc;
pub use store::{DocumentRecord, StateStore};
