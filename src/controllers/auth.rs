use crate::db::{with_connection, Database};
use crate::error::{is_unique_violation, AppError};
use crate::models::{User, UserPreferences};
use crate::session::{Session, SessionContext};
use crate::validation::{
    sanitize_input, validate_email, validate_password, validate_safe_text, validate_username,
};
use log::info;
use std::sync::{Arc, Mutex};

pub struct AuthController {
    db: Arc<Mutex<Database>>,
    bcrypt_cost: u32,
}

impl AuthController {
    pub fn new(db: Arc<Mutex<Database>>, bcrypt_cost: u32) -> Self {
        Self { db, bcrypt_cost }
    }

    /// Create an account with default preferences and log it in.
    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<Session, AppError> {
        let username = sanitize_input(username);
        let username = validate_username(&username)?;
        let email = validate_email(email)?;
        validate_password(password)?;

        let hash = bcrypt::hash(password, self.bcrypt_cost)?;

        let session = with_connection(&self.db, "register user", |conn| {
            if User::username_exists(conn, username)? {
                return Err(AppError::AlreadyExists {
                    name: username.to_string(),
                });
            }
            if User::email_exists(conn, email)? {
                return Err(AppError::AlreadyExists {
                    name: email.to_string(),
                });
            }

            let tx = conn.unchecked_transaction()?;
            let user = User::create(&tx, username, email, &hash)?;
            UserPreferences::create_default(&tx, user.id)?;
            Session::persist(&tx, user.id)?;
            tx.commit()?;
            Ok(Session::from(&user))
        })?;

        info!("Registered user {}", session.user_id);
        Ok(session)
    }

    /// Log in by username or email.
    pub fn login(&self, login: &str, password: &str) -> Result<Session, AppError> {
        let login = login.trim();
        if login.is_empty() || password.is_empty() {
            return Err(AppError::LoginFailed);
        }

        let user = with_connection(&self.db, "look up user", |conn| {
            Ok(User::find_by_login(conn, login)?)
        })?
        .ok_or(AppError::LoginFailed)?;

        if !bcrypt::verify(password, &user.password_hash)? {
            log::warn!("Failed login for user {}", user.id);
            return Err(AppError::LoginFailed);
        }

        with_connection(&self.db, "persist session", |conn| {
            Ok(Session::persist(conn, user.id)?)
        })?;

        info!("User {} logged in", user.id);
        Ok(Session::from(&user))
    }

    /// The last logged-in user, if any survived a restart.
    pub fn restore_session(&self) -> Result<Option<Session>, AppError> {
        with_connection(&self.db, "restore session", |conn| {
            Ok(Session::load_persisted(conn)?)
        })
    }

    pub fn logout(&self, ctx: &mut SessionContext) -> Result<(), AppError> {
        with_connection(&self.db, "clear session", |conn| {
            Ok(Session::clear_persisted(conn)?)
        })?;
        if let Some(session) = ctx.end() {
            info!("User {} logged out", session.user_id);
        }
        Ok(())
    }

    pub fn is_logged_in(ctx: &SessionContext) -> bool {
        ctx.is_logged_in()
    }

    /// Replace the password after verifying the current one. The stored
    /// hash is untouched on any failure.
    pub fn change_password(&self, session: &Session, current: &str, new: &str) -> Result<(), AppError> {
        if current.is_empty() {
            return Err(AppError::invalid("current_password", "Current password is required"));
        }
        validate_password(new)?;

        let user = with_connection(&self.db, "load user", |conn| {
            User::find_by_id(conn, session.user_id)?.ok_or(AppError::NotFound { entity: "User" })
        })?;

        if !bcrypt::verify(current, &user.password_hash)? {
            log::warn!("Rejected password change for user {}: wrong current password", user.id);
            return Err(AppError::InvalidCredentials);
        }

        let hash = bcrypt::hash(new, self.bcrypt_cost)?;
        with_connection(&self.db, "change password", |conn| {
            Ok(User::update_password_hash(conn, user.id, &hash)?)
        })?;

        info!("Password changed for user {}", user.id);
        Ok(())
    }

    /// Rename the session user. A taken name leaves the original in place.
    pub fn update_username(&self, session: &Session, new_username: &str) -> Result<Session, AppError> {
        let username = sanitize_input(new_username);
        let username = validate_username(&username)?;
        validate_safe_text("username", username)?;

        if username == session.username {
            return Ok(session.clone());
        }

        with_connection(&self.db, "update username", |conn| {
            match User::update_username(conn, session.user_id, username) {
                Ok(true) => Ok(()),
                Ok(false) => Err(AppError::NotFound { entity: "User" }),
                Err(e) if is_unique_violation(&e) => Err(AppError::AlreadyExists {
                    name: username.to_string(),
                }),
                Err(e) => Err(e.into()),
            }
        })?;

        info!("User {} changed username", session.user_id);
        Ok(Session {
            username: username.to_string(),
            ..session.clone()
        })
    }
}
