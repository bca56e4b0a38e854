// src/db/helpers.rs

use crate::db::Database;
use crate::error::{AppError, ErrorKind};
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

/// Lock the shared database, recovering from a poisoned mutex.
pub fn lock_db<'a>(db: &'a Arc<Mutex<Database>>, operation: &str) -> MutexGuard<'a, Database> {
    match db.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Database mutex was poisoned during {operation}, recovering");
            poisoned.into_inner()
        }
    }
}

/// Execute a database operation with lock handling and failure logging.
///
/// # Example
/// ```ignore
/// with_connection(&db, "load equipment", |conn| {
///     Ok(Equipment::find_all(conn)?)
/// })
/// ```
pub fn with_connection<F, T>(db: &Arc<Mutex<Database>>, operation: &str, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Connection) -> Result<T, AppError>,
{
    let db = lock_db(db, operation);

    f(db.connection()).map_err(|e| {
        match e.kind() {
            ErrorKind::Persistence => log::error!("Failed to {operation}: {e}"),
            ErrorKind::Validation | ErrorKind::Authorization => {
                log::warn!("Rejected {operation}: {e}");
            }
        }
        e
    })
}
