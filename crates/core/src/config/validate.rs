use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Base URLs are http(s) URLs
/// - Endpoint paths start with '/'
/// - Timeouts are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    check_base_url("assistant.base_url", &config.assistant.base_url)?;
    check_base_url("catalog.base_url", &config.catalog.base_url)?;

    for (key, path) in [
        ("assistant.status_path", &config.assistant.status_path),
        ("assistant.message_path", &config.assistant.message_path),
        ("catalog.freelancers_path", &config.catalog.freelancers_path),
        ("catalog.users_path", &config.catalog.users_path),
    ] {
        if !path.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "{} must start with '/', got {:?}",
                key, path
            )));
        }
    }

    if config.assistant.timeout_secs == 0 || config.catalog.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

fn check_base_url(key: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{} must be an http(s) URL, got {:?}",
            key, url
        )))
    }
}
