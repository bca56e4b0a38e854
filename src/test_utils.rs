//! Shared test utilities for FitLife.
//!
//! This module provides common setup functions used across test modules.

#![cfg(test)]

use crate::db::{migrations, Database};
use crate::models::{User, UserPreferences};
use crate::session::Session;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

/// Password used by every user created through [`register_test_user`].
pub const TEST_PASSWORD: &str = "secret1";

/// Cheapest cost bcrypt accepts (mirrors the crate-private `crate::test_utils::BCRYPT_MIN_COST`).
pub const BCRYPT_MIN_COST: u32 = 4;

/// Create a temporary test database with migrations applied.
///
/// Returns a tuple of (Database, TempDir). The TempDir must be kept alive
/// for the duration of the test to prevent the database file from being deleted.
pub fn setup_test_db() -> (Database, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory for test DB");
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).expect("Failed to open test database");
    migrations::run(db.connection()).expect("Failed to run migrations on test DB");
    (db, dir)
}

/// Same as [`setup_test_db`], wrapped for controllers.
pub fn setup_shared_db() -> (Arc<Mutex<Database>>, TempDir) {
    let (db, dir) = setup_test_db();
    (Arc::new(Mutex::new(db)), dir)
}

/// Insert a user with [`TEST_PASSWORD`] hashed at the cheapest bcrypt cost.
pub fn register_test_user(db: &Database, username: &str) -> Session {
    let conn = db.connection();
    let hash = bcrypt::hash(TEST_PASSWORD, crate::test_utils::BCRYPT_MIN_COST).expect("Failed to hash test password");
    let user = User::create(conn, username, &format!("{username}@example.com"), &hash)
        .expect("Failed to create test user");
    UserPreferences::create_default(conn, user.id).expect("Failed to create test preferences");
    Session::from(&user)
}

/// [`register_test_user`] against a shared database handle.
pub fn register_shared_user(db: &Arc<Mutex<Database>>, username: &str) -> Session {
    let guard = db.lock().expect("Test database lock poisoned");
    register_test_user(&guard, username)
}
