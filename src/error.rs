use serde::Serialize;
use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("'{name}' already exists")]
    AlreadyExists { name: String },

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Cannot delete: {reason}")]
    DeleteFailed { reason: String },

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Incorrect current password")]
    InvalidCredentials,

    #[error("Invalid username or password")]
    LoginFailed,

    #[error("{entity} belongs to another user")]
    Forbidden { entity: &'static str },

    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Lock poisoned")]
    LockPoisoned,

    #[error("{0}")]
    Internal(String),
}

/// How a failure is surfaced to the user.
///
/// Validation failures are shown inline next to the offending field.
/// Persistence and authorization failures become a transient notice; the
/// latter carries a specific message (wrong password, taken username).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Persistence,
    Authorization,
}

impl AppError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::Validation,
            Self::AlreadyExists { .. }
            | Self::NotLoggedIn
            | Self::InvalidCredentials
            | Self::LoginFailed
            | Self::Forbidden { .. } => ErrorKind::Authorization,
            Self::NotFound { .. }
            | Self::DeleteFailed { .. }
            | Self::PasswordHash(_)
            | Self::Database(_)
            | Self::LockPoisoned
            | Self::Internal(_) => ErrorKind::Persistence,
        }
    }

    /// The input field this error is attached to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidInput { field, .. } => Some(*field),
            Self::AlreadyExists { .. }
            | Self::NotFound { .. }
            | Self::DeleteFailed { .. }
            | Self::NotLoggedIn
            | Self::InvalidCredentials
            | Self::LoginFailed
            | Self::Forbidden { .. }
            | Self::PasswordHash(_)
            | Self::Database(_)
            | Self::LockPoisoned
            | Self::Internal(_) => None,
        }
    }
}

impl From<AppError> for String {
    fn from(e: AppError) -> Self {
        e.to_string()
    }
}

/// Check if a rusqlite error is a UNIQUE constraint violation
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(err, _)
        if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
}

/// Check if a rusqlite error is a FOREIGN KEY constraint violation
pub fn is_fk_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(err, _)
        if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}
