use crate::error::AppError;
use crate::models::week_start;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::Serialize;

/// A routine scheduled on one day of a Monday-based week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyWorkout {
    pub id: i64,
    pub user_id: i64,
    pub routine_id: i64,
    pub routine_name: String,
    pub scheduled_date: NaiveDate,
    pub week_start_date: NaiveDate,
    pub is_completed: bool,
    pub completion_time: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekProgress {
    pub completed: i64,
    pub total: i64,
}

const SELECT_WORKOUT: &str = "SELECT w.id, w.user_id, w.routine_id, r.name, w.scheduled_date,
        w.week_start_date, w.is_completed, w.completion_time
     FROM weekly_workouts w JOIN routines r ON r.id = w.routine_id";

impl WeeklyWorkout {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            routine_id: row.get(2)?,
            routine_name: row.get(3)?,
            scheduled_date: row.get(4)?,
            week_start_date: row.get(5)?,
            is_completed: row.get(6)?,
            completion_time: row.get(7)?,
        })
    }

    fn query_list(conn: &Connection, clause: &str, params: impl rusqlite::Params) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "{SELECT_WORKOUT} {clause} ORDER BY w.scheduled_date, w.id"
        ))?;
        let rows = stmt.query_map(params, Self::from_row)?;
        rows.collect()
    }

    pub fn schedule(conn: &Connection, user_id: i64, routine_id: i64, date: NaiveDate) -> Result<Self> {
        conn.execute(
            "INSERT INTO weekly_workouts (user_id, routine_id, scheduled_date, week_start_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, routine_id, date, week_start(date)],
        )?;
        let id = conn.last_insert_rowid();
        Self::find_by_id(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        conn.query_row(
            &format!("{SELECT_WORKOUT} WHERE w.id = ?1"),
            params![id],
            Self::from_row,
        )
        .optional()
    }

    pub fn find_for_week(conn: &Connection, user_id: i64, week: NaiveDate) -> Result<Vec<Self>> {
        Self::query_list(
            conn,
            "WHERE w.user_id = ?1 AND w.week_start_date = ?2",
            params![user_id, week_start(week)],
        )
    }

    /// Inclusive on both ends.
    pub fn find_in_range(conn: &Connection, user_id: i64, from: NaiveDate, to: NaiveDate) -> Result<Vec<Self>> {
        Self::query_list(
            conn,
            "WHERE w.user_id = ?1 AND w.scheduled_date BETWEEN ?2 AND ?3",
            params![user_id, from, to],
        )
    }

    /// Completion is one-way: a second call is rejected.
    pub fn mark_completed(conn: &Connection, id: i64, now: NaiveDateTime) -> std::result::Result<Self, AppError> {
        let rows = conn.execute(
            "UPDATE weekly_workouts SET is_completed = 1, completion_time = ?1
             WHERE id = ?2 AND is_completed = 0",
            params![now, id],
        )?;

        let workout = Self::find_by_id(conn, id)?.ok_or(AppError::NotFound {
            entity: "Scheduled workout",
        })?;
        if rows == 0 {
            return Err(AppError::invalid("workout", "Workout already completed"));
        }
        Ok(workout)
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let rows = conn.execute("DELETE FROM weekly_workouts WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn clear_week(conn: &Connection, user_id: i64, week: NaiveDate) -> Result<usize> {
        conn.execute(
            "DELETE FROM weekly_workouts WHERE user_id = ?1 AND week_start_date = ?2",
            params![user_id, week_start(week)],
        )
    }

    pub fn week_counts(conn: &Connection, user_id: i64, week: NaiveDate) -> Result<WeekProgress> {
        conn.query_row(
            "SELECT COALESCE(SUM(is_completed), 0), COUNT(*) FROM weekly_workouts
             WHERE user_id = ?1 AND week_start_date = ?2",
            params![user_id, week_start(week)],
            |row| {
                Ok(WeekProgress {
                    completed: row.get(0)?,
                    total: row.get(1)?,
                })
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Routine, User};
    use crate::test_utils::setup_test_db;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup(conn: &Connection) -> (i64, i64) {
        let user = User::create(conn, "lifter", "a@example.com", "hash").unwrap();
        let routine = Routine::create(conn, user.id, "Leg Day", "").unwrap();
        (user.id, routine.id)
    }

    #[test]
    fn test_schedule_derives_monday_week_start() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let (user_id, routine_id) = setup(conn);

        let workout = WeeklyWorkout::schedule(conn, user_id, routine_id, date(2024, 5, 17)).unwrap();
        assert_eq!(workout.week_start_date, date(2024, 5, 13));
        assert_eq!(workout.routine_name, "Leg Day");
        assert!(!workout.is_completed);
    }

    #[test]
    fn test_find_for_week_and_range() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let (user_id, routine_id) = setup(conn);

        WeeklyWorkout::schedule(conn, user_id, routine_id, date(2024, 5, 13)).unwrap();
        WeeklyWorkout::schedule(conn, user_id, routine_id, date(2024, 5, 19)).unwrap();
        WeeklyWorkout::schedule(conn, user_id, routine_id, date(2024, 5, 20)).unwrap();

        let week = WeeklyWorkout::find_for_week(conn, user_id, date(2024, 5, 15)).unwrap();
        assert_eq!(week.len(), 2);

        let range =
            WeeklyWorkout::find_in_range(conn, user_id, date(2024, 5, 19), date(2024, 5, 20)).unwrap();
        assert_eq!(range.len(), 2);
    }

    #[test]
    fn test_mark_completed_once() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let (user_id, routine_id) = setup(conn);
        let workout = WeeklyWorkout::schedule(conn, user_id, routine_id, date(2024, 5, 13)).unwrap();
        let now = date(2024, 5, 13).and_hms_opt(18, 30, 0).unwrap();

        let done = WeeklyWorkout::mark_completed(conn, workout.id, now).unwrap();
        assert!(done.is_completed);
        assert_eq!(done.completion_time, Some(now));

        let again = WeeklyWorkout::mark_completed(conn, workout.id, now);
        assert!(matches!(again, Err(AppError::InvalidInput { .. })));

        let missing = WeeklyWorkout::mark_completed(conn, 9999, now);
        assert!(matches!(missing, Err(AppError::NotFound { .. })));
    }

    #[test]
    fn test_week_counts_and_clear() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let (user_id, routine_id) = setup(conn);
        let monday = date(2024, 5, 13);

        let first = WeeklyWorkout::schedule(conn, user_id, routine_id, monday).unwrap();
        WeeklyWorkout::schedule(conn, user_id, routine_id, date(2024, 5, 15)).unwrap();
        WeeklyWorkout::mark_completed(conn, first.id, monday.and_hms_opt(9, 0, 0).unwrap()).unwrap();

        assert_eq!(
            WeeklyWorkout::week_counts(conn, user_id, monday).unwrap(),
            WeekProgress { completed: 1, total: 2 }
        );

        assert_eq!(WeeklyWorkout::clear_week(conn, user_id, monday).unwrap(), 2);
        assert_eq!(
            WeeklyWorkout::week_counts(conn, user_id, monday).unwrap(),
            WeekProgress { completed: 0, total: 0 }
        );
    }

    #[test]
    fn test_routine_delete_removes_schedule() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let (user_id, routine_id) = setup(conn);
        let workout = WeeklyWorkout::schedule(conn, user_id, routine_id, date(2024, 5, 13)).unwrap();

        Routine::delete(conn, routine_id).unwrap();
        assert!(WeeklyWorkout::find_by_id(conn, workout.id).unwrap().is_none());
    }
}
