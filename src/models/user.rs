use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

impl User {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    pub fn create(conn: &Connection, username: &str, email: &str, password_hash: &str) -> Result<Self> {
        conn.execute(
            "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)",
            params![username, email, password_hash],
        )?;
        let id = conn.last_insert_rowid();
        Self::find_by_id(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        conn.query_row(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .optional()
    }

    /// Look up a user by username or email; email matching ignores case.
    pub fn find_by_login(conn: &Connection, login: &str) -> Result<Option<Self>> {
        conn.query_row(
            "SELECT id, username, email, password_hash, created_at FROM users
             WHERE username = ?1 OR email = ?1 COLLATE NOCASE
             ORDER BY username = ?1 DESC LIMIT 1",
            params![login],
            Self::from_row,
        )
        .optional()
    }

    pub fn username_exists(conn: &Connection, username: &str) -> Result<bool> {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
            params![username],
            |row| row.get(0),
        )
    }

    /// Emails compare case-insensitively.
    pub fn email_exists(conn: &Connection, email: &str) -> Result<bool> {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 COLLATE NOCASE)",
            params![email],
            |row| row.get(0),
        )
    }

    pub fn update_username(conn: &Connection, id: i64, username: &str) -> Result<bool> {
        let rows = conn.execute(
            "UPDATE users SET username = ?1 WHERE id = ?2",
            params![username, id],
        )?;
        Ok(rows > 0)
    }

    pub fn update_password_hash(conn: &Connection, id: i64, password_hash: &str) -> Result<bool> {
        let rows = conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, id],
        )?;
        Ok(rows > 0)
    }
}

/// Biometric profile, created lazily with empty values on first read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetails {
    pub user_id: i64,
    pub age: i32,
    pub gender: String,
    pub height_cm: f64,
    pub weight_kg: f64,
}

impl UserDetails {
    pub fn find_or_create(conn: &Connection, user_id: i64) -> Result<Self> {
        conn.execute(
            "INSERT OR IGNORE INTO user_details (user_id) VALUES (?1)",
            params![user_id],
        )?;
        conn.query_row(
            "SELECT user_id, age, gender, height_cm, weight_kg FROM user_details WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(Self {
                    user_id: row.get(0)?,
                    age: row.get(1)?,
                    gender: row.get(2)?,
                    height_cm: row.get(3)?,
                    weight_kg: row.get(4)?,
                })
            },
        )
    }

    pub fn upsert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO user_details (user_id, age, gender, height_cm, weight_kg)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                age = excluded.age,
                gender = excluded.gender,
                height_cm = excluded.height_cm,
                weight_kg = excluded.weight_kg",
            params![self.user_id, self.age, self.gender, self.height_cm, self.weight_kg],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_unique_violation;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_create_and_find_user() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let user = User::create(conn, "lifter", "lifter@example.com", "hash").unwrap();
        assert!(user.id > 0);

        let found = User::find_by_id(conn, user.id).unwrap().unwrap();
        assert_eq!(found.username, "lifter");
        assert_eq!(found.password_hash, "hash");
    }

    #[test]
    fn test_find_by_login_matches_username_or_email() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let user = User::create(conn, "lifter", "lifter@example.com", "hash").unwrap();

        assert_eq!(User::find_by_login(conn, "lifter").unwrap().unwrap().id, user.id);
        assert_eq!(
            User::find_by_login(conn, "LIFTER@example.com").unwrap().unwrap().id,
            user.id
        );
        assert!(User::find_by_login(conn, "nobody").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        User::create(conn, "lifter", "a@example.com", "hash").unwrap();

        let err = User::create(conn, "lifter", "b@example.com", "hash").unwrap_err();
        assert!(is_unique_violation(&err));
        assert!(User::username_exists(conn, "lifter").unwrap());
        assert!(!User::username_exists(conn, "other").unwrap());
        assert!(User::email_exists(conn, "A@example.com").unwrap());
        assert!(!User::email_exists(conn, "c@example.com").unwrap());
    }

    #[test]
    fn test_update_username_and_password() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let user = User::create(conn, "lifter", "a@example.com", "hash").unwrap();

        assert!(User::update_username(conn, user.id, "runner").unwrap());
        assert!(User::update_password_hash(conn, user.id, "hash2").unwrap());

        let found = User::find_by_id(conn, user.id).unwrap().unwrap();
        assert_eq!(found.username, "runner");
        assert_eq!(found.password_hash, "hash2");
        assert!(!User::update_username(conn, 9999, "ghost").unwrap());
    }

    #[test]
    fn test_user_details_lazily_created() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let user = User::create(conn, "lifter", "a@example.com", "hash").unwrap();

        let details = UserDetails::find_or_create(conn, user.id).unwrap();
        assert_eq!(details.age, 0);
        assert_eq!(details.gender, "");

        let updated = UserDetails {
            age: 30,
            gender: "female".into(),
            height_cm: 170.0,
            weight_kg: 62.5,
            ..details
        };
        updated.upsert(conn).unwrap();

        assert_eq!(UserDetails::find_or_create(conn, user.id).unwrap(), updated);
    }
}
