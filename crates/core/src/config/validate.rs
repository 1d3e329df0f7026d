use super::{types::Config, ConfigError};
use crate::fetcher::HostDecorators;

/// Validate configuration
///
/// Checks value ranges serde cannot express, the storage container name and
/// that every host rule compiles.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    if config.fetcher.timeout_secs == 0 {
        return Err(invalid("fetcher.timeout_secs must be greater than 0"));
    }

    if !(1..=100).contains(&config.transform.jpeg_quality) {
        return Err(invalid(format!(
            "transform.jpeg_quality must be between 1 and 100, got {}",
            config.transform.jpeg_quality
        )));
    }

    if config.sync.max_concurrent_documents == 0 {
        return Err(invalid("sync.max_concurrent_documents must be greater than 0"));
    }

    if config.sync.retry.max_attempts == 0 {
        return Err(invalid("sync.retry.max_attempts must be greater than 0"));
    }

    if config.cache.retry.max_attempts == 0 {
        return Err(invalid("cache.retry.max_attempts must be greater than 0"));
    }

    if config.sync.catalogs.is_empty() {
        return Err(invalid("sync.catalogs must name at least one catalog"));
    }

    validate_container_name(&config.storage.container)?;

    HostDecorators::compile(&config.fetcher.host_rules)
        .map_err(|e| invalid(format!("fetcher.host_rules: {}", e)))?;

    Ok(())
}

fn validate_container_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(invalid("storage.container cannot be empty"));
    }
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-';
    if !name.chars().all(allowed) {
        return Err(invalid(format!(
            "storage.container '{}' may only contain lowercase letters, digits and '-'",
            name
        )));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::HostRule;

    fn assert_invalid(config: &Config, needle: &str) {
        match validate_config(config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains(needle), "unexpected message: {}", msg)
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        assert_invalid(&config, "server.port");
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = Config::default();
        config.fetcher.timeout_secs = 0;
        assert_invalid(&config, "fetcher.timeout_secs");
    }

    #[test]
    fn test_validate_jpeg_quality_range() {
        let mut config = Config::default();
        config.transform.jpeg_quality = 0;
        assert_invalid(&config, "jpeg_quality");

        config.transform.jpeg_quality = 101;
        assert_invalid(&config, "jpeg_quality");

        config.transform.jpeg_quality = 100;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_concurrency_and_attempts() {
        let mut config = Config::default();
        config.sync.max_concurrent_documents = 0;
        assert_invalid(&config, "max_concurrent_documents");

        let mut config = Config::default();
        config.sync.retry.max_attempts = 0;
        assert_invalid(&config, "sync.retry.max_attempts");

        let mut config = Config::default();
        config.cache.retry.max_attempts = 0;
        assert_invalid(&config, "cache.retry.max_attempts");
    }

    #[test]
    fn test_validate_catalogs_not_empty() {
        let mut config = Config::default();
        config.sync.catalogs.clear();
        assert_invalid(&config, "sync.catalogs");
    }

    #[test]
    fn test_validate_container_name() {
        let mut config = Config::default();
        config.storage.container = String::new();
        assert_invalid(&config, "cannot be empty");

        config.storage.container = "Media_Assets".to_string();
        assert_invalid(&config, "lowercase");

        config.storage.container = "media-assets-2".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_bad_host_rule() {
        let mut config = Config::default();
        config.fetcher.host_rules.push(HostRule::new("(unclosed"));
        assert_invalid(&config, "fetcher.host_rules");
    }
}
