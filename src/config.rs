//! Configuration loaded from environment variables.

use crate::constants::DEFAULT_HISTORY_LIMIT;
use directories::ProjectDirs;
use std::path::PathBuf;

/// Runtime configuration for the store and the bridge.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// bcrypt work factor for new password hashes.
    pub bcrypt_cost: u32,
    /// Default number of history rows returned when a caller gives no limit.
    pub history_limit: u32,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine project directories")]
    NoProjectDirs,

    #[error("Invalid FITLIFE_BCRYPT_COST: {0}")]
    InvalidBcryptCost(String),

    #[error("Invalid FITLIFE_HISTORY_LIMIT: {0}")]
    InvalidHistoryLimit(String),
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `FITLIFE_DB_PATH` | SQLite database file | platform data dir `/fitlife.db` |
    /// | `FITLIFE_BCRYPT_COST` | bcrypt cost, 4-31 | `bcrypt::DEFAULT_COST` |
    /// | `FITLIFE_HISTORY_LIMIT` | Default history page size | `50` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Read configuration through `get` so tests never touch the process
    /// environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let db_path = match get("FITLIFE_DB_PATH") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            Some(_) | None => default_db_path()?,
        };

        let bcrypt_cost = match get("FITLIFE_BCRYPT_COST") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|cost| (4..=31).contains(cost))
                .ok_or(ConfigError::InvalidBcryptCost(raw))?,
            None => bcrypt::DEFAULT_COST,
        };

        let history_limit = match get("FITLIFE_HISTORY_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidHistoryLimit(raw))?,
            None => DEFAULT_HISTORY_LIMIT,
        };

        Ok(Self {
            db_path,
            bcrypt_cost,
            history_limit,
        })
    }
}

fn default_db_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("com", "fitlife", "FitLife").ok_or(ConfigError::NoProjectDirs)?;
    Ok(proj_dirs.data_dir().join("fitlife.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_reads_values() {
        let get = |k: &str| match k {
            "FITLIFE_DB_PATH" => Some("/tmp/fit.db".into()),
            "FITLIFE_BCRYPT_COST" => Some("4".into()),
            "FITLIFE_HISTORY_LIMIT" => Some("10".into()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/fit.db"));
        assert_eq!(cfg.bcrypt_cost, 4);
        assert_eq!(cfg.history_limit, 10);
    }

    #[test]
    fn test_from_env_defaults() {
        let get = |k: &str| match k {
            "FITLIFE_DB_PATH" => Some("fit.db".into()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).unwrap();
        assert_eq!(cfg.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(cfg.history_limit, DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn test_from_env_rejects_bad_cost() {
        let get = |k: &str| match k {
            "FITLIFE_DB_PATH" => Some("fit.db".into()),
            "FITLIFE_BCRYPT_COST" => Some("99".into()),
            _ => None,
        };
        assert!(matches!(
            Config::from_env_with(get),
            Err(ConfigError::InvalidBcryptCost(_))
        ));
    }

    #[test]
    fn test_from_env_rejects_zero_history_limit() {
        let get = |k: &str| match k {
            "FITLIFE_DB_PATH" => Some("fit.db".into()),
            "FITLIFE_HISTORY_LIMIT" => Some("0".into()),
            _ => None,
        };
        assert!(matches!(
            Config::from_env_with(get),
            Err(ConfigError::InvalidHistoryLimit(_))
        ));
    }
}
