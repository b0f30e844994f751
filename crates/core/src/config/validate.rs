use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Storage base URL parses as an absolute http(s) URL
/// - Timeouts are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    match reqwest::Url::parse(&config.storage.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => {
            return Err(ConfigError::ValidationError(format!(
                "storage.base_url has unsupported scheme: {}",
                url.scheme()
            )));
        }
        Err(e) => {
            return Err(ConfigError::ValidationError(format!(
                "storage.base_url is not a valid URL: {}",
                e
            )));
        }
    }

    if config.storage.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "storage.request_timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.storage.lookup_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "storage.lookup_timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
