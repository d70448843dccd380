use crate::config::types::{CaptureConfig, Config, FetchConfig, SiteConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_fetch_config(&config.fetch)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_capture_config(&config.capture)?;
    validate_state_config(&config.state)?;
    Ok(())
}

/// Validates site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must be http(s), got '{}'",
            config.base_url
        )));
    }

    if !config.listing_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "listing-path must start with '/', got '{}'",
            config.listing_path
        )));
    }

    if config.page_size < 1 || config.page_size > 500 {
        return Err(ConfigError::Validation(format!(
            "page-size must be between 1 and 500, got {}",
            config.page_size
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    // A zero base delay hammers the source site
    if config.base_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "base-delay-ms must be >= 100ms, got {}ms",
            config.base_delay_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates capture configuration
fn validate_capture_config(config: &CaptureConfig) -> Result<(), ConfigError> {
    if config.screenshot_dir.is_empty() {
        return Err(ConfigError::Validation(
            "screenshot-dir cannot be empty".to_string(),
        ));
    }

    if config.command.is_empty() {
        return Err(ConfigError::Validation(
            "capture command cannot be empty".to_string(),
        ));
    }

    if config.width < 100 {
        return Err(ConfigError::Validation(format!(
            "width must be >= 100px, got {}",
            config.width
        )));
    }

    if config.quality < 1 || config.quality > 100 {
        return Err(ConfigError::Validation(format!(
            "quality must be between 1 and 100, got {}",
            config.quality
        )));
    }

    Ok(())
}

/// Validates state file configuration
fn validate_state_config(config: &crate::config::types::StateConfig) -> Result<(), ConfigError> {
    if config.results_path.is_empty() {
        return Err(ConfigError::Validation(
            "results-path cannot be empty".to_string(),
        ));
    }

    if config.assignments_path.is_empty() {
        return Err(ConfigError::Validation(
            "assignments-path cannot be empty".to_string(),
        ));
    }

    if config.results_path == config.assignments_path {
        return Err(ConfigError::Validation(
            "results-path and assignments-path must be distinct files".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation: one '@', non-empty local and domain parts
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() || !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "contact-email is not a valid email address: '{}'",
            email
        )));
    }
    Ok(())
}
