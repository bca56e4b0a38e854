use super::FormError;
use crate::controllers::AuthController;
use crate::error::AppError;
use crate::session::Session;
use crate::validation::{is_sql_safe, sanitize_input, validate_password_confirmation, validate_username};
use log::{debug, warn};
use serde::Serialize;
use std::sync::mpsc::Sender;

/// Sent to whoever opened the editor once a change is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum ProfileEvent {
    UsernameUpdated(String),
    PasswordUpdated,
}

/// Username and password editing.
pub struct ProfileEditor {
    events: Sender<ProfileEvent>,
}

impl ProfileEditor {
    pub fn new(events: Sender<ProfileEvent>) -> Self {
        Self { events }
    }

    fn notify(&self, event: ProfileEvent) {
        // A closed receiver just means nobody is listening any more.
        if self.events.send(event).is_err() {
            debug!("Profile event dropped: no listener");
        }
    }

    /// Returns the session carrying the new name.
    pub fn save_username(
        &self,
        auth: &AuthController,
        session: &Session,
        new_username: &str,
    ) -> Result<Session, FormError> {
        let username = sanitize_input(new_username);
        let username = validate_username(&username)?;
        if !is_sql_safe(username) {
            return Err(FormError::notice("Invalid characters in username"));
        }

        let updated = auth.update_username(session, username).map_err(|e| match e {
            AppError::InvalidInput { .. } => FormError::from(e),
            other => {
                warn!("Username update failed for user {}: {other}", session.user_id);
                FormError::notice("Failed to update username. Username may already exist.")
            }
        })?;

        self.notify(ProfileEvent::UsernameUpdated(updated.username.clone()));
        Ok(updated)
    }

    /// Checks run in order: current present, new password rules, confirmation
    /// match, then verification against the stored hash.
    pub fn save_password(
        &self,
        auth: &AuthController,
        session: &Session,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> Result<(), FormError> {
        if current.is_empty() {
            return Err(FormError::Field {
                field: "current_password",
                message: "Current password is required".into(),
            });
        }
        validate_password_confirmation(new, confirm)?;

        auth.change_password(session, current, new).map_err(|e| match e {
            AppError::InvalidCredentials => FormError::Field {
                field: "current_password",
                message: e.to_string(),
            },
            AppError::InvalidInput { .. } => FormError::from(e),
            other => {
                warn!("Password change failed for user {}: {other}", session.user_id);
                FormError::notice("Failed to update password. Please check your current password.")
            }
        })?;

        self.notify(ProfileEvent::PasswordUpdated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::test_utils::{register_shared_user, setup_shared_db, TEST_PASSWORD};
    use std::sync::mpsc::{channel, Receiver};
    use std::sync::{Arc, Mutex};

    fn setup(db: &Arc<Mutex<Database>>) -> (AuthController, ProfileEditor, Receiver<ProfileEvent>) {
        let (tx, rx) = channel();
        (
            AuthController::new(Arc::clone(db), crate::test_utils::BCRYPT_MIN_COST),
            ProfileEditor::new(tx),
            rx,
        )
    }

    #[test]
    fn test_save_username_sends_event() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let (auth, editor, rx) = setup(&db);

        let updated = editor.save_username(&auth, &session, "  newname ").unwrap();
        assert_eq!(updated.username, "newname");
        assert_eq!(rx.try_recv().unwrap(), ProfileEvent::UsernameUpdated("newname".into()));
    }

    #[test]
    fn test_taken_username_keeps_original() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        register_shared_user(&db, "runner");
        let (auth, editor, rx) = setup(&db);

        assert_eq!(
            editor.save_username(&auth, &session, "runner"),
            Err(FormError::notice(
                "Failed to update username. Username may already exist."
            ))
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(auth.login("lifter", TEST_PASSWORD).unwrap().username, "lifter");
    }

    #[test]
    fn test_username_rules() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let (auth, editor, _rx) = setup(&db);

        assert!(matches!(
            editor.save_username(&auth, &session, "ab"),
            Err(FormError::Field { field: "username", .. })
        ));
    }

    #[test]
    fn test_save_password_order_of_checks() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let (auth, editor, rx) = setup(&db);

        assert_eq!(
            editor.save_password(&auth, &session, "", "x", "y"),
            Err(FormError::Field {
                field: "current_password",
                message: "Current password is required".into()
            })
        );
        assert!(matches!(
            editor.save_password(&auth, &session, "wrong1", "abc", "abc"),
            Err(FormError::Field { field: "new_password", .. })
        ));
        assert_eq!(
            editor.save_password(&auth, &session, "wrong1", "longer1", "longer2"),
            Err(FormError::Field {
                field: "confirm_password",
                message: "Passwords do not match".into()
            })
        );
        assert_eq!(
            editor.save_password(&auth, &session, "wrong1", "longer1", "longer1"),
            Err(FormError::Field {
                field: "current_password",
                message: "Incorrect current password".into()
            })
        );
        assert!(rx.try_recv().is_err());
        assert!(auth.login("lifter", TEST_PASSWORD).is_ok());
    }

    #[test]
    fn test_save_password_success() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let (auth, editor, rx) = setup(&db);

        editor
            .save_password(&auth, &session, TEST_PASSWORD, "longer1", "longer1")
            .unwrap();
        assert_eq!(rx.try_recv().unwrap(), ProfileEvent::PasswordUpdated);
        assert!(auth.login("lifter", "longer1").is_ok());
    }

    #[test]
    fn test_closed_listener_is_not_an_error() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let (auth, editor, rx) = setup(&db);
        drop(rx);

        assert!(editor.save_username(&auth, &session, "renamed").is_ok());
    }
}
