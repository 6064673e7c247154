use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Database path is not empty
/// - Jackett url is http(s), api key is set, timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.database.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "database.path cannot be empty".to_string(),
        ));
    }

    if let Some(jackett) = &config.jackett {
        if !(jackett.url.starts_with("http://") || jackett.url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "jackett.url must be an http(s) URL, got '{}'",
                jackett.url
            )));
        }
        if jackett.api_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "jackett.api_key cannot be empty".to_string(),
            ));
        }
        if jackett.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "jackett.timeout_secs cannot be 0".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, JackettConfig};
    use std::path::PathBuf;

    fn jackett(url: &str, api_key: &str, timeout_secs: u32) -> Config {
        Config {
            jackett: Some(JackettConfig {
                url: url.to_string(),
                api_key: api_key.to_string(),
                timeout_secs,
                indexer: "all".to_string(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
        assert!(validate_config(&jackett("http://localhost:9117", "key", 30)).is_ok());
    }

    #[test]
    fn test_validate_empty_database_path_fails() {
        let config = Config {
            database: DatabaseConfig {
                path: PathBuf::new(),
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_jackett_fields() {
        assert!(validate_config(&jackett("localhost:9117", "key", 30)).is_err());
        assert!(validate_config(&jackett("http://localhost:9117", "", 30)).is_err());
        assert!(validate_config(&jackett("http://localhost:9117", "key", 0)).is_err());
    }
}
