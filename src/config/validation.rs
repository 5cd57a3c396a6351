use crate::config::types::{Config, EngineConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_engine_config(&config.engine)?;
    validate_seeds(&config.seeds)?;
    validate_proxies(&config.proxies)?;
    validate_user_agents(&config.identity.user_agents)?;
    Ok(())
}

/// Validates engine configuration
fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.pool_size < 1 || config.pool_size > 100 {
        return Err(ConfigError::Validation(format!(
            "pool_size must be between 1 and 100, got {}",
            config.pool_size
        )));
    }

    if config.retry_count < 1 {
        return Err(ConfigError::Validation(format!(
            "retry_count must be >= 1, got {}",
            config.retry_count
        )));
    }

    if config.fetch_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_ms must be >= 100ms, got {}ms",
            config.fetch_timeout_ms
        )));
    }

    Ok(())
}

/// Validates that seeds exist and are well-formed http(s) URLs
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    if seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed is required".to_string(),
        ));
    }

    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("seed '{}': {}", seed, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "seed '{}': scheme must be http or https",
                seed
            )));
        }
    }

    Ok(())
}

/// Validates that every proxy entry is a well-formed URL
fn validate_proxies(proxies: &[String]) -> Result<(), ConfigError> {
    for proxy in proxies {
        Url::parse(proxy)
            .map_err(|e| ConfigError::InvalidUrl(format!("proxy '{}': {}", proxy, e)))?;
    }
    Ok(())
}

/// Validates user-agent entries; an empty list is fine (defaults apply)
fn validate_user_agents(user_agents: &[String]) -> Result<(), ConfigError> {
    for agent in user_agents {
        if agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user-agents entries must not be blank".to_string(),
            ));
        }
    }
    Ok(())
}
