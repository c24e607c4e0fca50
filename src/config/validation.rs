use crate::config::types::{
    ClassifierConfig, Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

const MAX_POOL_SIZE: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_site_config(&config.site)?;
    validate_classifier_config(&config.classifier)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.pool_size < 1 || config.pool_size > MAX_POOL_SIZE {
        return Err(ConfigError::Validation(format!(
            "pool_size must be between 1 and {}, got {}",
            MAX_POOL_SIZE, config.pool_size
        )));
    }

    if config.target_count < 1 {
        return Err(ConfigError::Validation(
            "target_count must be >= 1".to_string(),
        ));
    }

    if config.worker_idle_ms == 0 || config.coordinator_idle_ms == 0 {
        return Err(ConfigError::Validation(format!(
            "idle intervals must be > 0ms, got worker={}ms coordinator={}ms",
            config.worker_idle_ms, config.coordinator_idle_ms
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be > 0".to_string(),
        ));
    }

    if config.counter_offset >= config.target_count {
        tracing::warn!(
            "counter_offset {} already meets target_count {}; the run will stop after seeding",
            config.counter_offset,
            config.target_count
        );
    }

    Ok(())
}

fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let entry = Url::parse(&config.entry_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid entry_url: {}", e)))?;

    if entry.scheme() != "http" && entry.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "entry_url must use http or https, got '{}'",
            entry.scheme()
        )));
    }

    if entry.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "entry_url '{}' has no host",
            config.entry_url
        )));
    }

    if config.detail_param.is_empty()
        || !config
            .detail_param
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "detail_param must be a non-empty identifier, got '{}'",
            config.detail_param
        )));
    }

    if !config.listing_prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "listing_prefix must start with '/', got '{}'",
            config.listing_prefix
        )));
    }

    Selector::parse(&config.link_scope)
        .map_err(|e| ConfigError::InvalidSelector(format!("{}: {:?}", config.link_scope, e)))?;

    Ok(())
}

fn validate_classifier_config(config: &ClassifierConfig) -> Result<(), ConfigError> {
    if config.category_keyword.trim().is_empty() || config.language_keyword.trim().is_empty() {
        return Err(ConfigError::Validation(
            "classifier keywords cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.pages_dir.is_empty() {
        return Err(ConfigError::Validation(
            "pages_dir cannot be empty".to_string(),
        ));
    }

    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let (local, domain) = email.split_once('@').ok_or_else(|| {
        ConfigError::Validation(format!("Invalid email format: '{}'", email))
    })?;

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
