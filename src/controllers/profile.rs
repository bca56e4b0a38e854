use crate::db::{with_connection, Database};
use crate::error::AppError;
use crate::models::{Sensitivity, Theme, Units, UserDetails, UserPreferences};
use crate::session::Session;
use crate::validation::{sanitize_input, validate_rest_seconds, validate_safe_text, validate_user_details};
use serde::Deserialize;
use std::sync::{Arc, Mutex};

/// Editable preference fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PreferencesUpdate {
    pub theme: Theme,
    pub notifications_enabled: bool,
    pub default_rest_seconds: i32,
    pub units: Units,
    pub shake_sensitivity: Sensitivity,
}

pub struct ProfileController {
    db: Arc<Mutex<Database>>,
}

impl ProfileController {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    pub fn details(&self, session: &Session) -> Result<UserDetails, AppError> {
        with_connection(&self.db, "load profile details", |conn| {
            Ok(UserDetails::find_or_create(conn, session.user_id)?)
        })
    }

    pub fn save_details(
        &self,
        session: &Session,
        age: i32,
        gender: &str,
        height_cm: f64,
        weight_kg: f64,
    ) -> Result<UserDetails, AppError> {
        validate_user_details(age, height_cm, weight_kg)?;
        let gender = sanitize_input(gender);
        validate_safe_text("gender", &gender)?;

        let details = UserDetails {
            user_id: session.user_id,
            age,
            gender,
            height_cm,
            weight_kg,
        };
        with_connection(&self.db, "save profile details", |conn| {
            Ok(details.upsert(conn)?)
        })?;
        Ok(details)
    }

    pub fn preferences(&self, session: &Session) -> Result<UserPreferences, AppError> {
        with_connection(&self.db, "load preferences", |conn| {
            Ok(UserPreferences::find_or_create(conn, session.user_id)?)
        })
    }

    pub fn save_preferences(
        &self,
        session: &Session,
        update: PreferencesUpdate,
    ) -> Result<UserPreferences, AppError> {
        validate_rest_seconds(update.default_rest_seconds)?;

        with_connection(&self.db, "save preferences", |conn| {
            let mut prefs = UserPreferences::find_or_create(conn, session.user_id)?;
            prefs.theme = update.theme;
            prefs.notifications_enabled = update.notifications_enabled;
            prefs.default_rest_seconds = update.default_rest_seconds;
            prefs.units = update.units;
            prefs.shake_sensitivity = update.shake_sensitivity;
            prefs.save(conn)?;
            Ok(prefs)
        })
    }

    pub fn toggle_theme(&self, session: &Session) -> Result<Theme, AppError> {
        with_connection(&self.db, "toggle theme", |conn| {
            Ok(UserPreferences::toggle_theme(conn, session.user_id)?)
        })
    }
}
