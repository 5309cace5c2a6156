//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.source.uri.is_empty() {
        return Err(MigrateError::Config("source.uri is required".into()));
    }
    if config.source.database.is_empty() {
        return Err(MigrateError::Config("source.database is required".into()));
    }

    // Target validation
    if config.target.host.is_empty() {
        return Err(MigrateError::Config("target.host is required".into()));
    }
    if config.target.database.is_empty() {
        return Err(MigrateError::Config("target.database is required".into()));
    }
    if config.target.user.is_empty() {
        return Err(MigrateError::Config("target.user is required".into()));
    }
    if config.target.password.is_empty() {
        return Err(MigrateError::Config("target.password is required".into()));
    }
    if config.target.timezone.is_empty() {
        return Err(MigrateError::Config("target.timezone is required".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SourceConfig, TargetConfig};

    fn valid_config() -> Config {
        Config {
            source: SourceConfig {
                uri: "mongodb://localhost:27017".to_string(),
                database: "billingService".to_string(),
            },
            target: TargetConfig {
                host: "127.0.0.1".to_string(),
                port: 3306,
                database: "billing_service".to_string(),
                user: "root".to_string(),
                password: "password".to_string(),
                timezone: "+00:00".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_source_uri() {
        let mut config = valid_config();
        config.source.uri = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_missing_target_password() {
        let mut config = valid_config();
        config.target.password = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_missing_target_host() {
        let mut config = valid_config();
        config.target.host = "".to_string();
        assert!(validate(&config).is_err());
    }
}
