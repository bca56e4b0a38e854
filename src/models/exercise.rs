use crate::constants::{DEFAULT_REPS, DEFAULT_REST_SECONDS, DEFAULT_SETS};
use crate::models::Equipment;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exercise {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub sets: i32,
    pub reps: i32,
    pub rest_seconds: i32,
    pub image_path: Option<String>,
    /// Equipment names in the order they were entered.
    pub equipment: Vec<String>,
    /// Instruction steps in order.
    pub instructions: Vec<String>,
    pub created_at: NaiveDateTime,
}

/// Caller-supplied fields for creating or updating an exercise.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExerciseDraft {
    pub name: String,
    #[serde(default = "default_sets")]
    pub sets: i32,
    #[serde(default = "default_reps")]
    pub reps: i32,
    #[serde(default = "default_rest")]
    pub rest_seconds: i32,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

fn default_sets() -> i32 {
    DEFAULT_SETS
}

fn default_reps() -> i32 {
    DEFAULT_REPS
}

fn default_rest() -> i32 {
    DEFAULT_REST_SECONDS
}

impl ExerciseDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sets: DEFAULT_SETS,
            reps: DEFAULT_REPS,
            rest_seconds: DEFAULT_REST_SECONDS,
            image_path: None,
            equipment: Vec::new(),
            instructions: Vec::new(),
        }
    }
}

const SELECT_EXERCISE: &str =
    "SELECT id, user_id, name, sets, reps, rest_seconds, image_path, created_at FROM exercises";

impl Exercise {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            sets: row.get(3)?,
            reps: row.get(4)?,
            rest_seconds: row.get(5)?,
            image_path: row.get(6)?,
            equipment: Vec::new(),
            instructions: Vec::new(),
            created_at: row.get(7)?,
        })
    }

    fn load_children(mut self, conn: &Connection) -> Result<Self> {
        let mut stmt = conn.prepare(
            "SELECT e.name FROM exercise_equipment ee
             JOIN equipment e ON e.id = ee.equipment_id
             WHERE ee.exercise_id = ?1 ORDER BY ee.position",
        )?;
        self.equipment = stmt
            .query_map(params![self.id], |row| row.get(0))?
            .collect::<Result<_>>()?;

        let mut stmt = conn.prepare(
            "SELECT instruction FROM exercise_instructions WHERE exercise_id = ?1 ORDER BY position",
        )?;
        self.instructions = stmt
            .query_map(params![self.id], |row| row.get(0))?
            .collect::<Result<_>>()?;

        Ok(self)
    }

    fn query_list(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, Self::from_row)?;
        rows.map(|row| row.and_then(|ex| ex.load_children(conn)))
            .collect()
    }

    fn replace_children(conn: &Connection, id: i64, draft: &ExerciseDraft) -> Result<()> {
        conn.execute("DELETE FROM exercise_equipment WHERE exercise_id = ?1", params![id])?;
        conn.execute("DELETE FROM exercise_instructions WHERE exercise_id = ?1", params![id])?;

        let mut position = 0_i64;
        for name in draft.equipment.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            let equipment = Equipment::find_or_create(conn, name)?;
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO exercise_equipment (exercise_id, equipment_id, position)
                 VALUES (?1, ?2, ?3)",
                params![id, equipment.id, position],
            )?;
            if inserted > 0 {
                position += 1;
            }
        }

        for (position, step) in draft
            .instructions
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .enumerate()
        {
            conn.execute(
                "INSERT INTO exercise_instructions (exercise_id, position, instruction) VALUES (?1, ?2, ?3)",
                params![id, i64::try_from(position).unwrap_or(i64::MAX), step],
            )?;
        }
        Ok(())
    }

    pub fn create(conn: &Connection, user_id: i64, draft: &ExerciseDraft) -> Result<Self> {
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO exercises (user_id, name, sets, reps, rest_seconds, image_path)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user_id,
                draft.name.trim(),
                draft.sets,
                draft.reps,
                draft.rest_seconds,
                draft.image_path,
            ],
        )?;
        let id = tx.last_insert_rowid();
        Self::replace_children(&tx, id, draft)?;
        tx.commit()?;

        Self::find_by_id(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let exercise = conn
            .query_row(&format!("{SELECT_EXERCISE} WHERE id = ?1"), params![id], Self::from_row)
            .optional()?;
        exercise.map(|ex| ex.load_children(conn)).transpose()
    }

    pub fn find_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Self>> {
        Self::query_list(
            conn,
            &format!("{SELECT_EXERCISE} WHERE user_id = ?1 ORDER BY name COLLATE NOCASE, id"),
            params![user_id],
        )
    }

    /// Case-insensitive substring match on the exercise name.
    pub fn search(conn: &Connection, user_id: i64, query: &str) -> Result<Vec<Self>> {
        Self::query_list(
            conn,
            &format!(
                "{SELECT_EXERCISE} WHERE user_id = ?1 AND instr(lower(name), lower(?2)) > 0
                 ORDER BY name COLLATE NOCASE, id"
            ),
            params![user_id, query.trim()],
        )
    }

    pub fn find_by_equipment(conn: &Connection, user_id: i64, equipment_name: &str) -> Result<Vec<Self>> {
        Self::query_list(
            conn,
            &format!(
                "{SELECT_EXERCISE} WHERE user_id = ?1 AND id IN (
                    SELECT ee.exercise_id FROM exercise_equipment ee
                    JOIN equipment e ON e.id = ee.equipment_id
                    WHERE e.name = ?2 COLLATE NOCASE)
                 ORDER BY name COLLATE NOCASE, id"
            ),
            params![user_id, equipment_name.trim()],
        )
    }

    pub fn recent(conn: &Connection, user_id: i64, limit: u32) -> Result<Vec<Self>> {
        Self::query_list(
            conn,
            &format!("{SELECT_EXERCISE} WHERE user_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2"),
            params![user_id, limit],
        )
    }

    /// Whether the user already has an exercise with this name, ignoring `exclude_id`.
    pub fn name_exists(conn: &Connection, user_id: i64, name: &str, exclude_id: Option<i64>) -> Result<bool> {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM exercises
             WHERE user_id = ?1 AND name = ?2 COLLATE NOCASE AND id IS NOT ?3)",
            params![user_id, name.trim(), exclude_id],
            |row| row.get(0),
        )
    }

    pub fn count_for_user(conn: &Connection, user_id: i64) -> Result<i64> {
        conn.query_row(
            "SELECT COUNT(*) FROM exercises WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
    }

    /// Overwrite fields and replace equipment and instruction lists.
    pub fn update(conn: &Connection, id: i64, draft: &ExerciseDraft) -> Result<bool> {
        let tx = conn.unchecked_transaction()?;
        let rows = tx.execute(
            "UPDATE exercises SET name = ?1, sets = ?2, reps = ?3, rest_seconds = ?4, image_path = ?5
             WHERE id = ?6",
            params![
                draft.name.trim(),
                draft.sets,
                draft.reps,
                draft.rest_seconds,
                draft.image_path,
                id,
            ],
        )?;
        if rows == 0 {
            return Ok(false);
        }
        Self::replace_children(&tx, id, draft)?;
        tx.commit()?;
        Ok(true)
    }

    /// Fails with a foreign key violation while routines or history reference it.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let rows = conn.execute("DELETE FROM exercises WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}
