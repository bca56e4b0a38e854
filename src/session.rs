//! Explicit login session passed to every user-scoped operation.

use crate::error::AppError;
use crate::models::User;
use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::{Deserialize, Serialize};

/// The logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

impl From<&User> for Session {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

impl Session {
    /// Remember `user_id` as the last logged-in user.
    pub fn persist(conn: &Connection, user_id: i64) -> Result<()> {
        conn.execute(
            "INSERT INTO app_session (id, user_id) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET user_id = excluded.user_id",
            params![user_id],
        )?;
        Ok(())
    }

    /// The persisted session, if its user still exists.
    pub fn load_persisted(conn: &Connection) -> Result<Option<Self>> {
        conn.query_row(
            "SELECT u.id, u.username, u.email FROM app_session s
             JOIN users u ON u.id = s.user_id WHERE s.id = 1",
            [],
            |row| {
                Ok(Self {
                    user_id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                })
            },
        )
        .optional()
    }

    pub fn clear_persisted(conn: &Connection) -> Result<()> {
        conn.execute("DELETE FROM app_session", [])?;
        Ok(())
    }
}

/// Holder for the current session, owned by the presentation layer.
#[derive(Debug, Default)]
pub struct SessionContext {
    current: Option<Session>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn require(&self) -> std::result::Result<&Session, AppError> {
        self.current.as_ref().ok_or(AppError::NotLoggedIn)
    }

    pub fn begin(&mut self, session: Session) {
        self.current = Some(session);
    }

    pub fn end(&mut self) -> Option<Session> {
        self.current.take()
    }

    /// Keep the held session in step with a username change.
    pub fn rename(&mut self, username: &str) {
        if let Some(session) = self.current.as_mut() {
            session.username = username.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    fn session() -> Session {
        Session {
            user_id: 1,
            username: "lifter".into(),
            email: "a@example.com".into(),
        }
    }

    #[test]
    fn test_context_lifecycle() {
        let mut ctx = SessionContext::new();
        assert!(!ctx.is_logged_in());
        assert!(matches!(ctx.require(), Err(AppError::NotLoggedIn)));

        ctx.begin(session());
        assert!(ctx.is_logged_in());
        ctx.rename("runner");
        assert_eq!(ctx.require().unwrap().username, "runner");

        assert_eq!(ctx.end().unwrap().user_id, 1);
        assert!(ctx.current().is_none());
    }

    #[test]
    fn test_persisted_session_round_trip() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let user = User::create(conn, "lifter", "a@example.com", "hash").unwrap();

        assert!(Session::load_persisted(conn).unwrap().is_none());

        Session::persist(conn, user.id).unwrap();
        Session::persist(conn, user.id).unwrap();
        assert_eq!(Session::load_persisted(conn).unwrap(), Some(Session::from(&user)));

        Session::clear_persisted(conn).unwrap();
        assert!(Session::load_persisted(conn).unwrap().is_none());
    }
}
