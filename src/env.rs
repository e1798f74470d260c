//! Environment variable helpers for building a [`FormatterConfig`].
//!
//! These are purely conveniences for services; the formatter itself
//! never reads the environment.

use crate::formatter::FormatterConfig;

/// Service name stamped into `s`. Required.
pub const APPLOG_SERVICE_ENV: &str = "APPLOG_SERVICE";

/// Environment name stamped into `e`.
pub const APPLOG_ENV_ENV: &str = "APPLOG_ENV";

pub const DEFAULT_ENVIRONMENT: &str = "prod";

/// Error type returned when the environment does not describe a config.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("APPLOG_SERVICE is not set or empty")]
    MissingService,
}

/// Build a [`FormatterConfig`] from `APPLOG_SERVICE` and `APPLOG_ENV`.
pub fn config_from_env() -> Result<FormatterConfig, ConfigError> {
    config_from_lookup(|key| std::env::var(key).ok())
}

fn config_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<FormatterConfig, ConfigError> {
    let service = lookup(APPLOG_SERVICE_ENV)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::MissingService)?;
    let environment = lookup(APPLOG_ENV_ENV)
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
    Ok(FormatterConfig::new(service, environment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn service_is_required() {
        assert_eq!(config_from_lookup(lookup(&[])), Err(ConfigError::MissingService));
        assert_eq!(
            config_from_lookup(lookup(&[(APPLOG_SERVICE_ENV, "  ")])),
            Err(ConfigError::MissingService)
        );
    }

    #[test]
    fn environment_defaults_to_prod() {
        let config = config_from_lookup(lookup(&[(APPLOG_SERVICE_ENV, "test.server")])).unwrap();
        assert_eq!(config, FormatterConfig::new("test.server", "prod"));

        let config = config_from_lookup(lookup(&[
            (APPLOG_SERVICE_ENV, "test.server"),
            (APPLOG_ENV_ENV, "staging"),
        ]))
        .unwrap();
        assert_eq!(config.environment, "staging");
    }
}
