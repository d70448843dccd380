use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// This is used to detect if the configuration has changed between runs.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const VALID_CONFIG: &str = r#"
[site]
base-url = "https://stats.example.org"
listing-path = "/releasecalendar/data"
page-size = 50
max-pages = 15
page-data-suffix = "/data"

[fetch]
base-delay-ms = 1000
jitter-ms = 250
max-attempts = 11
backoff-floor-secs = 10

[user-agent]
crawler-name = "Relsnap"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[capture]
screenshot-dir = "./screenshots"
command = "shot-scraper"
fallback-browser = "firefox"
incompatibility-marker = "Protocol error"
width = 1280
wait-ms = 4000
quality = 60
post-capture-pause-secs = 10

[state]
results-path = "./articles-and-dvcs.json"
assignments-path = "./screenshot-filenames.json"
"#;

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.site.page_size, 50);
        assert_eq!(config.site.max_pages, 15);
        assert_eq!(config.fetch.max_attempts, 11);
        assert_eq!(config.capture.wait_ms, 4000);
        assert_eq!(config.user_agent.crawler_name, "Relsnap");
    }

    #[test]
    fn test_page_data_suffix_defaults_to_empty() {
        let content = VALID_CONFIG.replace("page-data-suffix = \"/data\"\n", "");
        let file = create_temp_config(&content);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.site.page_data_suffix, "");
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("this is not [valid toml");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(load_config(Path::new("/nonexistent/relsnap.toml")).is_err());
    }

    #[test]
    fn test_config_hash_is_stable() {
        let file = create_temp_config(VALID_CONFIG);
        let h1 = compute_config_hash(file.path()).unwrap();
        let h2 = compute_config_hash(file.path()).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn test_user_agent_header_value() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();
        assert_eq!(
            config.user_agent.header_value(),
            "Relsnap/1.0 (+https://example.com/about; admin@example.com)"
        );
    }
}
