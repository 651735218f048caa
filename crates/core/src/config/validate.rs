use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Page size and session limit are positive
/// - The selected search backend has a usable URL and API key
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.presentation.page_size == 0 {
        return Err(ConfigError::ValidationError(
            "presentation.page_size must be at least 1".to_string(),
        ));
    }

    if config.presentation.max_sessions == 0 {
        return Err(ConfigError::ValidationError(
            "presentation.max_sessions must be at least 1".to_string(),
        ));
    }

    if let Some(searcher) = &config.searcher {
        let backend = searcher.backend.as_str();
        let active = searcher.active().ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "searcher.backend is \"{0}\" but [searcher.{0}] is missing",
                backend
            ))
        })?;

        if !(active.url.starts_with("http://") || active.url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "searcher.{}.url must start with http:// or https://",
                backend
            )));
        }

        if active.api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "searcher.{}.api_key must be provided",
                backend
            )));
        }

        if active.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(format!(
                "searcher.{}.timeout_secs cannot be 0",
                backend
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AggregatorConfig, SearcherBackend, SearcherConfig, ServerConfig};

    fn prowlarr(url: &str, api_key: &str) -> Config {
        Config {
            searcher: Some(SearcherConfig {
                backend: SearcherBackend::Prowlarr,
                prowlarr: Some(AggregatorConfig {
                    url: url.to_string(),
                    api_key: api_key.to_string(),
                    timeout_secs: 30,
                }),
                jackett: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
        assert!(validate_config(&prowlarr("http://localhost:9696", "key")).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                port: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_page_size_zero_fails() {
        let mut config = Config::default();
        config.presentation.page_size = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_missing_backend_section_fails() {
        let config = Config {
            searcher: Some(SearcherConfig {
                backend: SearcherBackend::Jackett,
                prowlarr: None,
                jackett: None,
            }),
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("[searcher.jackett]"));
    }

    #[test]
    fn test_validate_bad_url_fails() {
        let err = validate_config(&prowlarr("localhost:9696", "key")).unwrap_err();
        assert!(err.to_string().contains("url"));
    }

    #[test]
    fn test_validate_empty_api_key_fails() {
        let err = validate_config(&prowlarr("http://localhost:9696", "  ")).unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }
}
