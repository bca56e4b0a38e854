use crate::constants::{DEFAULT_REPS, DEFAULT_REST_SECONDS, DEFAULT_SETS};
use crate::models::Exercise;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Routine {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
    /// Exercises in execution order.
    pub exercises: Vec<RoutineExercise>,
}

/// Per-routine targets for one exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseTargets {
    pub sets: i32,
    pub reps: i32,
    pub rest_seconds: i32,
}

impl Default for ExerciseTargets {
    fn default() -> Self {
        Self {
            sets: DEFAULT_SETS,
            reps: DEFAULT_REPS,
            rest_seconds: DEFAULT_REST_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineExercise {
    pub id: i64,
    pub routine_id: i64,
    pub exercise_id: i64,
    pub position: i64,
    pub sets: i32,
    pub reps: i32,
    pub rest_seconds: i32,
    pub exercise: Exercise,
}

/// Lightweight row for the workouts list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSummary {
    pub routine_id: i64,
    pub name: String,
    pub user_id: i64,
    pub created_at: NaiveDateTime,
    pub exercise_count: i64,
}

impl Routine {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            created_at: row.get(4)?,
            exercises: Vec::new(),
        })
    }

    pub fn create(conn: &Connection, user_id: i64, name: &str, description: &str) -> Result<Self> {
        conn.execute(
            "INSERT INTO routines (user_id, name, description) VALUES (?1, ?2, ?3)",
            params![user_id, name, description],
        )?;
        let id = conn.last_insert_rowid();
        Self::find_by_id(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let routine = conn
            .query_row(
                "SELECT id, user_id, name, description, created_at FROM routines WHERE id = ?1",
                params![id],
                Self::from_row,
            )
            .optional()?;

        match routine {
            Some(mut routine) => {
                routine.exercises = RoutineExercise::find_for_routine(conn, routine.id)?;
                Ok(Some(routine))
            }
            None => Ok(None),
        }
    }

    /// Newest first.
    pub fn find_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, description, created_at FROM routines
             WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![user_id], Self::from_row)?;
        rows.map(|row| {
            let mut routine = row?;
            routine.exercises = RoutineExercise::find_for_routine(conn, routine.id)?;
            Ok(routine)
        })
        .collect()
    }

    pub fn update(conn: &Connection, id: i64, name: &str, description: &str) -> Result<bool> {
        let rows = conn.execute(
            "UPDATE routines SET name = ?1, description = ?2 WHERE id = ?3",
            params![name, description, id],
        )?;
        Ok(rows > 0)
    }

    /// Removes the routine with its exercise slots and schedule entries.
    /// History rows keep their data and lose the routine link.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let rows = conn.execute("DELETE FROM routines WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn count_for_user(conn: &Connection, user_id: i64) -> Result<i64> {
        conn.query_row(
            "SELECT COUNT(*) FROM routines WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
    }
}

impl RoutineExercise {
    fn from_row(conn: &Connection, row: &Row) -> Result<Self> {
        let exercise_id: i64 = row.get(2)?;
        let exercise =
            Exercise::find_by_id(conn, exercise_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        Ok(Self {
            id: row.get(0)?,
            routine_id: row.get(1)?,
            exercise_id,
            position: row.get(3)?,
            sets: row.get(4)?,
            reps: row.get(5)?,
            rest_seconds: row.get(6)?,
            exercise,
        })
    }

    /// Append an exercise to the end of a routine.
    pub fn add(
        conn: &Connection,
        routine_id: i64,
        exercise_id: i64,
        targets: Option<ExerciseTargets>,
    ) -> Result<Self> {
        let targets = targets.unwrap_or_default();
        conn.execute(
            "INSERT INTO routine_exercises (routine_id, exercise_id, position, sets, reps, rest_seconds)
             VALUES (?1, ?2,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM routine_exercises WHERE routine_id = ?1),
                ?3, ?4, ?5)",
            params![routine_id, exercise_id, targets.sets, targets.reps, targets.rest_seconds],
        )?;
        let id = conn.last_insert_rowid();
        Self::find_by_id(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, routine_id, exercise_id, position, sets, reps, rest_seconds
             FROM routine_exercises WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::from_row(conn, row)?)),
            None => Ok(None),
        }
    }

    pub fn find_for_routine(conn: &Connection, routine_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, routine_id, exercise_id, position, sets, reps, rest_seconds
             FROM routine_exercises WHERE routine_id = ?1 ORDER BY position, id",
        )?;
        let rows = stmt.query_map(params![routine_id], |row| Self::from_row(conn, row))?;
        rows.collect()
    }

    pub fn update_targets(conn: &Connection, id: i64, targets: ExerciseTargets) -> Result<bool> {
        let rows = conn.execute(
            "UPDATE routine_exercises SET sets = ?1, reps = ?2, rest_seconds = ?3 WHERE id = ?4",
            params![targets.sets, targets.reps, targets.rest_seconds, id],
        )?;
        Ok(rows > 0)
    }

    /// Remove one slot and close the gap in positions.
    pub fn remove(conn: &Connection, id: i64) -> Result<bool> {
        let Some(slot) = Self::find_by_id(conn, id)? else {
            return Ok(false);
        };

        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM routine_exercises WHERE id = ?1", params![id])?;
        tx.execute(
            "UPDATE routine_exercises SET position = position - 1
             WHERE routine_id = ?1 AND position > ?2",
            params![slot.routine_id, slot.position],
        )?;
        tx.commit()?;
        Ok(true)
    }

    /// Move a slot to `position` (clamped), shifting the others.
    pub fn move_to(conn: &Connection, id: i64, position: usize) -> Result<bool> {
        let Some(slot) = Self::find_by_id(conn, id)? else {
            return Ok(false);
        };

        let mut ids: Vec<i64> = {
            let mut stmt = conn.prepare(
                "SELECT id FROM routine_exercises WHERE routine_id = ?1 ORDER BY position, id",
            )?;
            let rows = stmt.query_map(params![slot.routine_id], |row| row.get(0))?;
            rows.collect::<Result<_>>()?
        };
        ids.retain(|other| *other != id);
        ids.insert(position.min(ids.len()), id);

        let tx = conn.unchecked_transaction()?;
        for (index, slot_id) in ids.iter().enumerate() {
            tx.execute(
                "UPDATE routine_exercises SET position = ?1 WHERE id = ?2",
                params![i64::try_from(index).unwrap_or(i64::MAX), slot_id],
            )?;
        }
        tx.commit()?;
        Ok(true)
    }
}

impl WorkoutSummary {
    pub fn list_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT r.id, r.name, r.user_id, r.created_at,
                    (SELECT COUNT(*) FROM routine_exercises re WHERE re.routine_id = r.id)
             FROM routines r WHERE r.user_id = ?1
             ORDER BY r.created_at DESC, r.id DESC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(Self {
                routine_id: row.get(0)?,
                name: row.get(1)?,
                user_id: row.get(2)?,
                created_at: row.get(3)?,
                exercise_count: row.get(4)?,
            })
        })?;
        rows.collect()
    }
}
