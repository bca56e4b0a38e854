use crate::constants::DEFAULT_REST_SECONDS;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

/// Shake-to-act sensitivity, stored as 1 (low) to 3 (high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

impl Sensitivity {
    pub fn level(self) -> i32 {
        match self {
            Sensitivity::Low => 1,
            Sensitivity::Medium => 2,
            Sensitivity::High => 3,
        }
    }
}

impl ToSql for Theme {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Theme {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

impl ToSql for Units {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Units {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

impl ToSql for Sensitivity {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.level()))
    }
}

impl FromSql for Sensitivity {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_i64()? {
            1 => Ok(Sensitivity::Low),
            2 => Ok(Sensitivity::Medium),
            3 => Ok(Sensitivity::High),
            other => Err(FromSqlError::OutOfRange(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub id: i64,
    pub user_id: i64,
    pub theme: Theme,
    pub notifications_enabled: bool,
    pub default_rest_seconds: i32,
    pub units: Units,
    pub shake_sensitivity: Sensitivity,
}

impl UserPreferences {
    /// Insert the default row for a user. No-op when one already exists.
    pub fn create_default(conn: &Connection, user_id: i64) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO user_preferences
                (user_id, theme, notifications_enabled, default_rest_seconds, units, shake_sensitivity)
             VALUES (?1, ?2, 1, ?3, ?4, ?5)",
            params![
                user_id,
                Theme::default(),
                DEFAULT_REST_SECONDS,
                Units::default(),
                Sensitivity::default(),
            ],
        )?;
        Ok(())
    }

    pub fn find_or_create(conn: &Connection, user_id: i64) -> Result<Self> {
        Self::create_default(conn, user_id)?;
        conn.query_row(
            "SELECT id, user_id, theme, notifications_enabled, default_rest_seconds, units, shake_sensitivity
             FROM user_preferences WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(Self {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    theme: row.get(2)?,
                    notifications_enabled: row.get(3)?,
                    default_rest_seconds: row.get(4)?,
                    units: row.get(5)?,
                    shake_sensitivity: row.get(6)?,
                })
            },
        )
    }

    pub fn save(&self, conn: &Connection) -> Result<bool> {
        let rows = conn.execute(
            "UPDATE user_preferences SET
                theme = ?1, notifications_enabled = ?2, default_rest_seconds = ?3,
                units = ?4, shake_sensitivity = ?5
             WHERE user_id = ?6",
            params![
                self.theme,
                self.notifications_enabled,
                self.default_rest_seconds,
                self.units,
                self.shake_sensitivity,
                self.user_id,
            ],
        )?;
        Ok(rows > 0)
    }

    /// Flip light/dark and return the new theme.
    pub fn toggle_theme(conn: &Connection, user_id: i64) -> Result<Theme> {
        let mut prefs = Self::find_or_create(conn, user_id)?;
        prefs.theme = prefs.theme.toggled();
        prefs.save(conn)?;
        Ok(prefs.theme)
    }
}
