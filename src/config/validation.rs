use crate::config::types::{Config, CrawlerConfig, StoreConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler(&config.crawler)?;
    validate_user_agent(&config.user_agent)?;
    validate_store(&config.store)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

fn validate_crawler(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 512 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 512, got {}",
            config.workers
        )));
    }

    if config.min_interval_secs < 1 {
        return Err(ConfigError::Validation(
            "min-interval-secs must be >= 1".to_string(),
        ));
    }

    if config.stats_interval_secs < 1 {
        return Err(ConfigError::Validation(
            "stats-interval-secs must be >= 1".to_string(),
        ));
    }

    for suffix in &config.accepted_suffixes {
        if suffix.is_empty() {
            return Err(ConfigError::Validation(
                "accepted-suffixes entries cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_user_agent(config: &UserAgentConfig) -> Result<(), ConfigError> {
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
        .map_err(|e| ConfigError::InvalidUrl(format!("invalid contact-url: {}", e)))?;

    let email = &config.contact_email;
    let valid_email = email.split_once('@').map(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    });
    if valid_email != Some(true) {
        return Err(ConfigError::Validation(format!(
            "contact-email does not look like an email address: '{}'",
            email
        )));
    }

    Ok(())
}

fn validate_store(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.root.is_empty() {
        return Err(ConfigError::Validation(
            "store root cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("invalid seed '{}': {}", seed, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "seed '{}' must be http or https",
                seed
            )));
        }
    }
    Ok(())
}
