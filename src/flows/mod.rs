// src/flows/mod.rs
//
// Form state machines for the editing screens. They hold field values, run
// the same checks a screen runs before saving, and report what to show. No
// rendering happens here.

pub mod profile_editor;
pub mod routine_editor;

pub use profile_editor::{ProfileEditor, ProfileEvent};
pub use routine_editor::{EditorMode, RoutineEditor, SaveOutcome};

use crate::error::{AppError, ErrorKind};
use serde::Serialize;
use std::fmt;

/// What a failed save shows: an inline message on one field, or a notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormError {
    Field { field: &'static str, message: String },
    Notice(String),
}

impl FormError {
    pub fn notice(message: impl Into<String>) -> Self {
        Self::Notice(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Field { message, .. } | Self::Notice(message) => message,
        }
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<AppError> for FormError {
    fn from(e: AppError) -> Self {
        match (e.kind(), e.field()) {
            (ErrorKind::Validation, Some(field)) => Self::Field {
                field,
                message: e.to_string(),
            },
            _ => Self::Notice(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_becomes_field_error() {
        let form: FormError = AppError::invalid("routine_name", "Routine name is required").into();
        assert_eq!(
            form,
            FormError::Field {
                field: "routine_name",
                message: "Routine name is required".into()
            }
        );
    }

    #[test]
    fn test_other_errors_become_notices() {
        let form: FormError = AppError::InvalidCredentials.into();
        assert_eq!(form, FormError::notice("Incorrect current password"));
        assert_eq!(form.to_string(), "Incorrect current password");
    }
}
