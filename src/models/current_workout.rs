use crate::models::RoutineExercise;
use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseStatus {
    #[default]
    Pending,
    Done,
    Skipped,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }
}

impl ExerciseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseStatus::Pending => "pending",
            ExerciseStatus::Done => "done",
            ExerciseStatus::Skipped => "skipped",
        }
    }
}

impl ToSql for SessionStatus {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SessionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "pending" => Ok(SessionStatus::Pending),
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

impl ToSql for ExerciseStatus {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ExerciseStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "pending" => Ok(ExerciseStatus::Pending),
            "done" => Ok(ExerciseStatus::Done),
            "skipped" => Ok(ExerciseStatus::Skipped),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// A routine queued in the user's "current workouts" list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWorkout {
    pub id: i64,
    pub user_id: i64,
    pub routine_id: i64,
    pub routine_name: String,
    pub status: SessionStatus,
    pub started_at: Option<NaiveDateTime>,
    /// Routine exercises not hidden from this session.
    pub exercise_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentExercise {
    pub routine_exercise: RoutineExercise,
    pub status: ExerciseStatus,
}

const SELECT_CURRENT: &str = "SELECT c.id, c.user_id, c.routine_id, r.name, c.status, c.started_at,
        (SELECT COUNT(*) FROM routine_exercises re
         WHERE re.routine_id = c.routine_id
           AND re.id NOT IN (SELECT h.routine_exercise_id FROM current_workout_hidden_exercises h
                             WHERE h.current_workout_id = c.id))
     FROM current_workouts c JOIN routines r ON r.id = c.routine_id";

impl CurrentWorkout {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            routine_id: row.get(2)?,
            routine_name: row.get(3)?,
            status: row.get(4)?,
            started_at: row.get(5)?,
            exercise_count: row.get(6)?,
        })
    }

    /// Queue a routine. One entry per user and routine.
    pub fn add(conn: &Connection, user_id: i64, routine_id: i64) -> Result<Self> {
        conn.execute(
            "INSERT INTO current_workouts (user_id, routine_id, status) VALUES (?1, ?2, ?3)",
            params![user_id, routine_id, SessionStatus::Pending],
        )?;
        let id = conn.last_insert_rowid();
        Self::find_by_id(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        conn.query_row(&format!("{SELECT_CURRENT} WHERE c.id = ?1"), params![id], Self::from_row)
            .optional()
    }

    pub fn find_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!("{SELECT_CURRENT} WHERE c.user_id = ?1 ORDER BY c.id"))?;
        let rows = stmt.query_map(params![user_id], Self::from_row)?;
        rows.collect()
    }

    /// Moving to `InProgress` stamps `started_at` the first time.
    pub fn set_status(conn: &Connection, id: i64, status: SessionStatus, now: NaiveDateTime) -> Result<bool> {
        let rows = conn.execute(
            "UPDATE current_workouts SET status = ?1,
                started_at = CASE WHEN ?1 = 'in_progress' AND started_at IS NULL THEN ?2 ELSE started_at END
             WHERE id = ?3",
            params![status, now, id],
        )?;
        Ok(rows > 0)
    }

    pub fn set_exercise_status(
        conn: &Connection,
        id: i64,
        routine_exercise_id: i64,
        status: ExerciseStatus,
    ) -> Result<()> {
        conn.execute(
            "INSERT INTO current_workout_exercise_status (current_workout_id, routine_exercise_id, status)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(current_workout_id, routine_exercise_id) DO UPDATE SET status = excluded.status",
            params![id, routine_exercise_id, status],
        )?;
        Ok(())
    }

    /// Hide an exercise from this session only; the routine keeps it.
    pub fn hide_exercise(conn: &Connection, id: i64, routine_exercise_id: i64) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO current_workout_hidden_exercises (current_workout_id, routine_exercise_id)
             VALUES (?1, ?2)",
            params![id, routine_exercise_id],
        )?;
        Ok(())
    }

    /// Routine exercises minus hidden ones, in routine order, with status.
    pub fn exercises(conn: &Connection, id: i64) -> Result<Vec<CurrentExercise>> {
        let Some(current) = Self::find_by_id(conn, id)? else {
            return Ok(Vec::new());
        };

        let hidden: HashSet<i64> = {
            let mut stmt = conn.prepare(
                "SELECT routine_exercise_id FROM current_workout_hidden_exercises WHERE current_workout_id = ?1",
            )?;
            let rows = stmt.query_map(params![id], |row| row.get(0))?;
            rows.collect::<Result<_>>()?
        };
        let statuses: HashMap<i64, ExerciseStatus> = {
            let mut stmt = conn.prepare(
                "SELECT routine_exercise_id, status FROM current_workout_exercise_status
                 WHERE current_workout_id = ?1",
            )?;
            let rows = stmt.query_map(params![id], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect::<Result<_>>()?
        };

        Ok(RoutineExercise::find_for_routine(conn, current.routine_id)?
            .into_iter()
            .filter(|re| !hidden.contains(&re.id))
            .map(|re| CurrentExercise {
                status: statuses.get(&re.id).copied().unwrap_or_default(),
                routine_exercise: re,
            })
            .collect())
    }

    pub fn remove(conn: &Connection, id: i64) -> Result<bool> {
        let rows = conn.execute("DELETE FROM current_workouts WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn clear_for_user(conn: &Connection, user_id: i64) -> Result<usize> {
        conn.execute("DELETE FROM current_workouts WHERE user_id = ?1", params![user_id])
    }
}
