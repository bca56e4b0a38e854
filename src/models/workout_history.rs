use crate::error::{is_unique_violation, AppError};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::Serialize;

/// One performed workout. Open until `finish` records its completion time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutHistory {
    pub id: i64,
    pub user_id: i64,
    /// `None` once the routine has been deleted.
    pub routine_id: Option<i64>,
    pub routine_name: Option<String>,
    pub workout_date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub completion_time: Option<NaiveDateTime>,
    pub total_duration_minutes: i64,
    pub exercises_completed: i64,
    pub notes: String,
    pub completions: Vec<ExerciseCompletion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseCompletion {
    pub id: i64,
    pub history_id: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub sets_completed: i32,
    pub reps_completed: i32,
    pub weight_used: Option<f64>,
    pub completion_time: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryTotals {
    pub workouts: i64,
    pub exercises: i64,
    pub minutes: i64,
}

const SELECT_HISTORY: &str = "SELECT h.id, h.user_id, h.routine_id, r.name, h.workout_date, h.start_time,
        h.completion_time, h.total_duration_minutes, h.exercises_completed, h.notes
     FROM workout_history h LEFT JOIN routines r ON r.id = h.routine_id";

impl WorkoutHistory {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            routine_id: row.get(2)?,
            routine_name: row.get(3)?,
            workout_date: row.get(4)?,
            start_time: row.get(5)?,
            completion_time: row.get(6)?,
            total_duration_minutes: row.get(7)?,
            exercises_completed: row.get(8)?,
            notes: row.get(9)?,
            completions: Vec::new(),
        })
    }

    fn query_list(conn: &Connection, clause: &str, params: impl rusqlite::Params) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!("{SELECT_HISTORY} {clause}"))?;
        let rows = stmt.query_map(params, Self::from_row)?;
        rows.map(|row| {
            let mut history = row?;
            history.completions = ExerciseCompletion::find_for_history(conn, history.id)?;
            Ok(history)
        })
        .collect()
    }

    pub fn is_finished(&self) -> bool {
        self.completion_time.is_some()
    }

    pub fn start(conn: &Connection, user_id: i64, routine_id: Option<i64>, now: NaiveDateTime) -> Result<Self> {
        conn.execute(
            "INSERT INTO workout_history (user_id, routine_id, workout_date, start_time)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, routine_id, now.date(), now],
        )?;
        let id = conn.last_insert_rowid();
        Self::find_by_id(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
    }

    /// Close the workout: duration in whole minutes since start, completion
    /// count from recorded exercises. Only allowed once.
    pub fn finish(
        conn: &Connection,
        id: i64,
        now: NaiveDateTime,
        notes: &str,
    ) -> std::result::Result<Self, AppError> {
        let history = Self::find_by_id(conn, id)?.ok_or(AppError::NotFound { entity: "Workout" })?;
        if history.is_finished() {
            return Err(AppError::invalid("workout", "Workout already finished"));
        }

        let minutes = (now - history.start_time).num_minutes().max(0);
        let completed = i64::try_from(history.completions.len()).unwrap_or(i64::MAX);
        conn.execute(
            "UPDATE workout_history
             SET completion_time = ?1, total_duration_minutes = ?2, exercises_completed = ?3, notes = ?4
             WHERE id = ?5",
            params![now, minutes, completed, notes, id],
        )?;

        Self::find_by_id(conn, id)?.ok_or(AppError::NotFound { entity: "Workout" })
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let history = conn
            .query_row(&format!("{SELECT_HISTORY} WHERE h.id = ?1"), params![id], Self::from_row)
            .optional()?;
        match history {
            Some(mut history) => {
                history.completions = ExerciseCompletion::find_for_history(conn, history.id)?;
                Ok(Some(history))
            }
            None => Ok(None),
        }
    }

    /// Newest first.
    pub fn find_for_user(conn: &Connection, user_id: i64, limit: u32) -> Result<Vec<Self>> {
        Self::query_list(
            conn,
            "WHERE h.user_id = ?1 ORDER BY h.start_time DESC, h.id DESC LIMIT ?2",
            params![user_id, limit],
        )
    }

    /// Workouts dated within `from..=to`, newest first.
    pub fn find_in_range(conn: &Connection, user_id: i64, from: NaiveDate, to: NaiveDate) -> Result<Vec<Self>> {
        Self::query_list(
            conn,
            "WHERE h.user_id = ?1 AND h.workout_date BETWEEN ?2 AND ?3
             ORDER BY h.start_time DESC, h.id DESC",
            params![user_id, from, to],
        )
    }

    pub fn totals(conn: &Connection, user_id: i64) -> Result<HistoryTotals> {
        conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(exercises_completed), 0), COALESCE(SUM(total_duration_minutes), 0)
             FROM workout_history WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(HistoryTotals {
                    workouts: row.get(0)?,
                    exercises: row.get(1)?,
                    minutes: row.get(2)?,
                })
            },
        )
    }

    /// Completions go with it.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let rows = conn.execute("DELETE FROM workout_history WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

impl ExerciseCompletion {
    pub fn record(
        conn: &Connection,
        history_id: i64,
        exercise_id: i64,
        sets_completed: i32,
        reps_completed: i32,
        weight_used: Option<f64>,
        now: NaiveDateTime,
    ) -> std::result::Result<Self, AppError> {
        let state: Option<(bool, Option<i64>)> = conn
            .query_row(
                "SELECT completion_time IS NOT NULL, routine_id FROM workout_history WHERE id = ?1",
                params![history_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let routine_id = match state {
            None => return Err(AppError::NotFound { entity: "Workout" }),
            Some((true, _)) => return Err(AppError::invalid("workout", "Workout already finished")),
            Some((false, routine_id)) => routine_id,
        };

        // A routine-based workout only logs that routine's exercises.
        if let Some(routine_id) = routine_id {
            let in_routine: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM routine_exercises WHERE routine_id = ?1 AND exercise_id = ?2)",
                params![routine_id, exercise_id],
                |row| row.get(0),
            )?;
            if !in_routine {
                return Err(AppError::NotFound {
                    entity: "Routine exercise",
                });
            }
        }

        // One completion per exercise and workout.
        match conn.execute(
            "INSERT INTO exercise_completions
                (history_id, exercise_id, sets_completed, reps_completed, weight_used, completion_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![history_id, exercise_id, sets_completed, reps_completed, weight_used, now],
        ) {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                let name: String = conn.query_row(
                    "SELECT name FROM exercises WHERE id = ?1",
                    params![exercise_id],
                    |row| row.get(0),
                )?;
                return Err(AppError::AlreadyExists { name });
            }
            Err(e) => return Err(e.into()),
        }
        let id = conn.last_insert_rowid();

        Ok(conn.query_row(
            "SELECT c.id, c.history_id, c.exercise_id, e.name, c.sets_completed, c.reps_completed,
                    c.weight_used, c.completion_time
             FROM exercise_completions c JOIN exercises e ON e.id = c.exercise_id
             WHERE c.id = ?1",
            params![id],
            Self::from_row,
        )?)
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            history_id: row.get(1)?,
            exercise_id: row.get(2)?,
            exercise_name: row.get(3)?,
            sets_completed: row.get(4)?,
            reps_completed: row.get(5)?,
            weight_used: row.get(6)?,
            completion_time: row.get(7)?,
        })
    }

    pub fn find_for_history(conn: &Connection, history_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT c.id, c.history_id, c.exercise_id, e.name, c.sets_completed, c.reps_completed,
                    c.weight_used, c.completion_time
             FROM exercise_completions c JOIN exercises e ON e.id = c.exercise_id
             WHERE c.history_id = ?1 ORDER BY c.completion_time, c.id",
        )?;
        let rows = stmt.query_map(params![history_id], Self::from_row)?;
        rows.collect()
    }
}
