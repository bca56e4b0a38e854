use crate::constants::{USER_EQUIPMENT_CATEGORY, USER_EQUIPMENT_DESCRIPTION};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Equipment {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: String,
}

impl Equipment {
    pub(crate) fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            description: row.get(3)?,
        })
    }

    pub fn find_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, category, description FROM equipment ORDER BY category, name",
        )?;
        let rows = stmt.query_map([], Self::from_row)?;
        rows.collect()
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        conn.query_row(
            "SELECT id, name, category, description FROM equipment WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .optional()
    }

    /// Case-insensitive lookup by name.
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Self>> {
        conn.query_row(
            "SELECT id, name, category, description FROM equipment WHERE name = ?1 COLLATE NOCASE",
            params![name.trim()],
            Self::from_row,
        )
        .optional()
    }

    /// Return the named item, creating it as user-added equipment if unknown.
    pub fn find_or_create(conn: &Connection, name: &str) -> Result<Self> {
        if let Some(existing) = Self::find_by_name(conn, name)? {
            return Ok(existing);
        }

        let name = name.trim();
        conn.execute(
            "INSERT INTO equipment (name, category, description) VALUES (?1, ?2, ?3)",
            params![name, USER_EQUIPMENT_CATEGORY, USER_EQUIPMENT_DESCRIPTION],
        )?;
        log::debug!("Created equipment '{name}'");

        Ok(Self {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            category: USER_EQUIPMENT_CATEGORY.to_string(),
            description: USER_EQUIPMENT_DESCRIPTION.to_string(),
        })
    }

    pub fn categories(conn: &Connection) -> Result<Vec<String>> {
        let mut stmt = conn.prepare("SELECT DISTINCT category FROM equipment ORDER BY category")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect()
    }
}
