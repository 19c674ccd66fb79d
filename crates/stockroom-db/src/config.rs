//! Store configuration from environment variables.
//!
//! Every variable is optional and falls back to the [`DbConfig::new`] default.
//!
//! | Variable                      | Default          |
//! |-------------------------------|------------------|
//! | `STOCKROOM_DATABASE_PATH`     | `./stockroom.db` |
//! | `STOCKROOM_MAX_CONNECTIONS`   | `5`              |
//! | `STOCKROOM_BUSY_TIMEOUT_SECS` | `5`              |

use std::env;
use std::time::Duration;

use crate::pool::DbConfig;

pub const DATABASE_PATH_VAR: &str = "STOCKROOM_DATABASE_PATH";
pub const MAX_CONNECTIONS_VAR: &str = "STOCKROOM_MAX_CONNECTIONS";
pub const BUSY_TIMEOUT_VAR: &str = "STOCKROOM_BUSY_TIMEOUT_SECS";

pub const DEFAULT_DATABASE_PATH: &str = "./stockroom.db";

impl DbConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. `from_env` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup(DATABASE_PATH_VAR)
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());

        let mut config = DbConfig::new(path);

        if let Some(raw) = lookup(MAX_CONNECTIONS_VAR) {
            let max: u32 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(MAX_CONNECTIONS_VAR.to_string()))?;
            if max == 0 {
                return Err(ConfigError::InvalidValue(MAX_CONNECTIONS_VAR.to_string()));
            }
            config = config.max_connections(max).min_connections(1);
        }

        if let Some(raw) = lookup(BUSY_TIMEOUT_VAR) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(BUSY_TIMEOUT_VAR.to_string()))?;
            config = config.busy_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DbConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let config = DbConfig::from_lookup(lookup(&[
            (DATABASE_PATH_VAR, "/var/lib/stockroom/shop.db"),
            (MAX_CONNECTIONS_VAR, "8"),
            (BUSY_TIMEOUT_VAR, "30"),
        ]))
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/stockroom/shop.db"));
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.busy_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_values() {
        let err = DbConfig::from_lookup(lookup(&[(MAX_CONNECTIONS_VAR, "lots")])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for STOCKROOM_MAX_CONNECTIONS");

        assert!(DbConfig::from_lookup(lookup(&[(MAX_CONNECTIONS_VAR, "0")])).is_err());
        assert!(DbConfig::from_lookup(lookup(&[(BUSY_TIMEOUT_VAR, "-1")])).is_err());
    }
}
