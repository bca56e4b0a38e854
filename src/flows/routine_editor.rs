use super::FormError;
use crate::controllers::RoutineController;
use crate::error::ErrorKind;
use crate::session::Session;
use crate::validation::{is_sql_safe, sanitize_input, validate_routine_name};
use log::warn;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EditorMode {
    Create,
    Edit { routine_id: i64 },
}

/// Successful save. Either way the screen closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// A new routine; the user may continue into exercise selection.
    Created {
        routine_id: i64,
        offer_exercise_selection: bool,
    },
    Updated { routine_id: i64 },
}

/// Create or edit a routine's name and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineEditor {
    mode: EditorMode,
    pub name: String,
    pub description: String,
}

impl RoutineEditor {
    pub fn create() -> Self {
        Self {
            mode: EditorMode::Create,
            name: String::new(),
            description: String::new(),
        }
    }

    /// Open an existing routine with its fields filled in.
    pub fn edit(controller: &RoutineController, session: &Session, routine_id: i64) -> Result<Self, FormError> {
        let routine = controller
            .get_routine_by_id(session, routine_id)?
            .ok_or_else(|| FormError::notice("Routine not found"))?;
        Ok(Self {
            mode: EditorMode::Edit { routine_id },
            name: routine.name,
            description: routine.description,
        })
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Validate and store. On failure nothing is written and the editor
    /// keeps its fields.
    pub fn save(&self, controller: &RoutineController, session: &Session) -> Result<SaveOutcome, FormError> {
        let name = sanitize_input(&self.name);
        let description = sanitize_input(&self.description);

        validate_routine_name(&name)?;
        if !is_sql_safe(&name) || !is_sql_safe(&description) {
            return Err(FormError::notice("Invalid characters detected in input"));
        }

        match self.mode {
            EditorMode::Create => controller
                .create_routine(session, &name, &description)
                .map(|routine_id| SaveOutcome::Created {
                    routine_id,
                    offer_exercise_selection: true,
                })
                .map_err(|e| {
                    warn!("Routine create failed: {e}");
                    match e.kind() {
                        ErrorKind::Validation => FormError::from(e),
                        ErrorKind::Persistence | ErrorKind::Authorization => {
                            FormError::notice("Failed to create routine")
                        }
                    }
                }),
            EditorMode::Edit { routine_id } => controller
                .update_routine(session, routine_id, &name, &description)
                .map(|()| SaveOutcome::Updated { routine_id })
                .map_err(|e| {
                    warn!("Routine {routine_id} update failed: {e}");
                    match e.kind() {
                        ErrorKind::Validation => FormError::from(e),
                        ErrorKind::Persistence | ErrorKind::Authorization => {
                            FormError::notice("Failed to update routine")
                        }
                    }
                }),
        }
    }
}
