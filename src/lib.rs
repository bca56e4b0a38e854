pub mod bridge;
pub mod config;
pub mod constants;
pub mod controllers;
pub mod db;
pub mod error;
pub mod flows;
pub mod models;
pub mod session;
#[cfg(test)]
mod test_utils;
pub mod validation;

use crate::config::Config;
use crate::db::{migrations, Database};
use log::info;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Error type for FitLife initialization failures
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Could not create data directory: {0}")]
    DataDirCreation(std::io::Error),
    #[error("Failed to open database: {0}")]
    DatabaseOpen(rusqlite::Error),
    #[error("Failed to run database migrations: {0}")]
    Migration(rusqlite::Error),
}

/// Open the configured database, creating its directory and applying the
/// schema, and wrap it for the controllers.
pub fn open_store(config: &Config) -> Result<Arc<Mutex<Database>>, InitError> {
    if let Some(dir) = config.db_path.parent() {
        std::fs::create_dir_all(dir).map_err(InitError::DataDirCreation)?;
    }

    let db = Database::open(&config.db_path).map_err(InitError::DatabaseOpen)?;
    migrations::run(db.connection()).map_err(InitError::Migration)?;
    info!("Database ready at {}", config.db_path.display());

    Ok(Arc::new(Mutex::new(db)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_store_creates_nested_directory() {
        let dir = tempdir().unwrap();
        let config = Config {
            db_path: dir.path().join("nested").join("fitlife.db"),
            bcrypt_cost: crate::test_utils::BCRYPT_MIN_COST,
            history_limit: 50,
        };

        let db = open_store(&config).unwrap();
        assert!(config.db_path.exists());

        let guard = db.lock().unwrap();
        let seeded: i64 = guard
            .connection()
            .query_row("SELECT COUNT(*) FROM equipment", [], |row| row.get(0))
            .unwrap();
        assert_eq!(seeded, 18);
    }

    #[test]
    fn test_open_store_twice_keeps_catalog() {
        let dir = tempdir().unwrap();
        let config = Config {
            db_path: dir.path().join("fitlife.db"),
            bcrypt_cost: crate::test_utils::BCRYPT_MIN_COST,
            history_limit: 50,
        };
        drop(open_store(&config).unwrap());

        let db = open_store(&config).unwrap();
        let guard = db.lock().unwrap();
        let seeded: i64 = guard
            .connection()
            .query_row("SELECT COUNT(*) FROM equipment", [], |row| row.get(0))
            .unwrap();
        assert_eq!(seeded, 18);
    }
}
