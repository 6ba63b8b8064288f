use crate::config::types::{
    Config, DetailConfig, HttpConfig, ListingConfig, RetryConfig, SelectorConfig,
};
use crate::{ConfigError, ConfigResult};
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_listing_config(&config.listing)?;
    validate_detail_config(&config.detail)?;
    validate_retry_config(&config.retry)?;
    validate_http_config(&config.http)?;
    validate_selector_config(&config.selectors)?;
    Ok(())
}

/// Validates the listing range and its optional explicit index
fn validate_listing_config(config: &ListingConfig) -> ConfigResult<()> {
    validate_base_url("listing.base-url", &config.base_url)?;

    if config.start_point > config.end_point {
        return Err(ConfigError::Validation(format!(
            "start-point ({}) must not exceed end-point ({})",
            config.start_point, config.end_point
        )));
    }

    if let Some(index) = &config.index {
        // Positions are used to index the list directly, so it must reach end-point
        if index.len() <= config.end_point as usize {
            return Err(ConfigError::Validation(format!(
                "index has {} entries but end-point {} needs at least {}",
                index.len(),
                config.end_point,
                config.end_point as usize + 1
            )));
        }
    }

    Ok(())
}

fn validate_detail_config(config: &DetailConfig) -> ConfigResult<()> {
    validate_base_url("detail.base-url", &config.base_url)
}

fn validate_retry_config(config: &RetryConfig) -> ConfigResult<()> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "retry.max-attempts must be >= 1".to_string(),
        ));
    }

    if config.min_backoff_secs > config.max_backoff_secs {
        return Err(ConfigError::Validation(format!(
            "retry.min-backoff-secs ({}) must not exceed retry.max-backoff-secs ({})",
            config.min_backoff_secs, config.max_backoff_secs
        )));
    }

    if config.multiplier.is_nan() || config.multiplier < 1.0 {
        return Err(ConfigError::Validation(format!(
            "retry.multiplier must be >= 1.0, got {}",
            config.multiplier
        )));
    }

    if config.max_delay_secs < config.min_backoff_secs {
        return Err(ConfigError::Validation(format!(
            "retry.max-delay-secs ({}) must be >= retry.min-backoff-secs ({})",
            config.max_delay_secs, config.min_backoff_secs
        )));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> ConfigResult<()> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "http.user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "http.timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Checks every selector string parses, so strategies can be built infallibly later
fn validate_selector_config(config: &SelectorConfig) -> ConfigResult<()> {
    let single = [
        ("links", &config.links),
        ("name", &config.name),
        ("level", &config.level),
        ("school", &config.school),
        ("tags", &config.tags),
        ("classes", &config.classes),
        ("casting-time", &config.casting_time),
        ("duration", &config.duration),
        ("range", &config.range),
        ("components", &config.components),
        ("material", &config.material),
        ("target", &config.target),
        ("ritual", &config.ritual),
        ("source", &config.source),
        ("saving-throw", &config.saving_throw),
    ];

    for (field, selector) in single {
        check_selector(field, selector)?;
    }

    for selector in &config.texts {
        check_selector("texts", selector)?;
    }

    Ok(())
}

fn check_selector(field: &str, selector: &str) -> ConfigResult<()> {
    Selector::parse(selector).map(|_| ()).map_err(|_| {
        ConfigError::Validation(format!(
            "selectors.{} is not a valid CSS selector: '{}'",
            field, selector
        ))
    })
}

fn validate_base_url(field: &str, base_url: &str) -> ConfigResult<()> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, base_url
        )));
    }

    Ok(())
}
