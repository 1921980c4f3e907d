use crate::config::types::{
    ActorConfig, Config, HttpConfig, SearchConfig, SiteConfig, KNOWN_PLATFORMS,
};
use crate::ConfigError;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_search_config(&config.search)?;
    validate_url("proxy.endpoint", &config.proxy.endpoint)?;
    validate_actor_config(&config.actor)?;
    validate_actor_budget(&config.actor, &config.search)?;
    validate_bind(&config.server.bind)?;
    validate_platform_overrides(&config.platforms)?;
    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 || config.proxy_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got timeout-secs={} proxy-timeout-secs={}",
            config.timeout_secs, config.proxy_timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.max_results_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "max-results-limit must be >= 1, got {}",
            config.max_results_limit
        )));
    }

    if config.default_max_results < 1 || config.default_max_results > config.max_results_limit {
        return Err(ConfigError::Validation(format!(
            "default-max-results must be between 1 and {}, got {}",
            config.max_results_limit, config.default_max_results
        )));
    }

    if config.platform_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "platform-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.platforms.is_empty() {
        return Err(ConfigError::Validation(
            "at least one platform must be enabled".to_string(),
        ));
    }

    for (i, platform) in config.platforms.iter().enumerate() {
        validate_platform_key(platform)?;

        if config.platforms[..i].contains(platform) {
            return Err(ConfigError::Validation(format!(
                "platform '{}' is listed more than once",
                platform
            )));
        }
    }

    Ok(())
}

fn validate_actor_config(config: &ActorConfig) -> Result<(), ConfigError> {
    validate_url("actor.base-url", &config.base_url)?;

    if config.actor_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "actor-id cannot be empty".to_string(),
        ));
    }

    if config.poll_interval_ms < 1 || config.max_polls < 1 {
        return Err(ConfigError::Validation(format!(
            "poll-interval-ms and max-polls must be >= 1, got {} and {}",
            config.poll_interval_ms, config.max_polls
        )));
    }

    if let (Some(min), Some(max)) = (config.min_price, config.max_price) {
        if min > max {
            return Err(ConfigError::Validation(format!(
                "min-price ({}) cannot exceed max-price ({})",
                min, max
            )));
        }
    }

    Ok(())
}

/// An enabled actor must be able to finish polling before the platform deadline
fn validate_actor_budget(actor: &ActorConfig, search: &SearchConfig) -> Result<(), ConfigError> {
    let budget_ms = actor.poll_interval_ms.saturating_mul(u64::from(actor.max_polls));
    if actor.enabled && budget_ms >= search.platform_timeout_secs.saturating_mul(1000) {
        return Err(ConfigError::Validation(format!(
            "actor polling budget ({}ms) must be below platform-timeout-secs ({}s)",
            budget_ms, search.platform_timeout_secs
        )));
    }

    Ok(())
}

fn validate_bind(bind: &str) -> Result<(), ConfigError> {
    bind.parse::<SocketAddr>()
        .map(|_| ())
        .map_err(|e| ConfigError::Validation(format!("Invalid server bind '{}': {}", bind, e)))
}

fn validate_platform_overrides(overrides: &BTreeMap<String, SiteConfig>) -> Result<(), ConfigError> {
    for (platform, site) in overrides {
        validate_platform_key(platform)?;

        if let Some(base_url) = &site.base_url {
            // The Craigslist template is only a URL once the site is filled in
            validate_url(
                &format!("platforms.{}.base-url", platform),
                &base_url.replace("{site}", "sfbay"),
            )?;
        }

        if let Some(price) = site.placeholder_price {
            if !price.is_finite() || price <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "platforms.{}.placeholder-price must be positive, got {}",
                    platform, price
                )));
            }
        }
    }

    Ok(())
}

fn validate_platform_key(platform: &str) -> Result<(), ConfigError> {
    if KNOWN_PLATFORMS.contains(&platform) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "unknown platform '{}', expected one of {}",
            platform,
            KNOWN_PLATFORMS.join(", ")
        )))
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            field, value
        )));
    }

    Ok(())
}
