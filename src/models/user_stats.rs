use rusqlite::{params, Connection, Result};
use serde::Serialize;

/// Activity summary derived from stored rows on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub user_id: i64,
    /// Workout history entries, finished or not.
    pub total_sessions: i64,
    pub total_routines: i64,
    /// Distinct exercises used across the user's routines.
    pub total_exercises: i64,
    /// Distinct calendar days with at least one workout.
    pub active_days: i64,
}

impl UserStats {
    pub fn compute(conn: &Connection, user_id: i64) -> Result<Self> {
        conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM workout_history WHERE user_id = ?1),
                (SELECT COUNT(*) FROM routines WHERE user_id = ?1),
                (SELECT COUNT(DISTINCT re.exercise_id) FROM routine_exercises re
                 JOIN routines r ON r.id = re.routine_id WHERE r.user_id = ?1),
                (SELECT COUNT(DISTINCT workout_date) FROM workout_history WHERE user_id = ?1)",
            params![user_id],
            |row| {
                Ok(Self {
                    user_id,
                    total_sessions: row.get(0)?,
                    total_routines: row.get(1)?,
                    total_exercises: row.get(2)?,
                    active_days: row.get(3)?,
                })
            },
        )
    }
}
