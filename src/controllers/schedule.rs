use super::owned;
use super::routine::owned_routine;
use crate::db::{with_connection, Database};
use crate::error::AppError;
use crate::models::{now, WeekProgress, WeeklyWorkout};
use crate::session::Session;
use chrono::NaiveDate;
use log::info;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn owned_workout(conn: &Connection, session: &Session, id: i64) -> Result<WeeklyWorkout, AppError> {
    owned(
        WeeklyWorkout::find_by_id(conn, id)?,
        |w| w.user_id,
        session,
        "Scheduled workout",
    )
}

/// Weekly workout planning.
pub struct ScheduleController {
    db: Arc<Mutex<Database>>,
}

impl ScheduleController {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    pub fn add_routine_to_week(
        &self,
        session: &Session,
        routine_id: i64,
        date: NaiveDate,
    ) -> Result<WeeklyWorkout, AppError> {
        with_connection(&self.db, "schedule routine", |conn| {
            owned_routine(conn, session, routine_id)?;
            Ok(WeeklyWorkout::schedule(conn, session.user_id, routine_id, date)?)
        })
    }

    pub fn current_week(&self, session: &Session) -> Result<Vec<WeeklyWorkout>, AppError> {
        self.week(session, now().date())
    }

    /// Workouts scheduled for the current day.
    pub fn today(&self, session: &Session) -> Result<Vec<WeeklyWorkout>, AppError> {
        let today = now().date();
        self.in_range(session, today, today)
    }

    /// Workouts in the Monday-based week containing `date`.
    pub fn week(&self, session: &Session, date: NaiveDate) -> Result<Vec<WeeklyWorkout>, AppError> {
        with_connection(&self.db, "load weekly workouts", |conn| {
            Ok(WeeklyWorkout::find_for_week(conn, session.user_id, date)?)
        })
    }

    pub fn in_range(
        &self,
        session: &Session,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WeeklyWorkout>, AppError> {
        if from > to {
            return Err(AppError::invalid("date_range", "Start date must not be after end date"));
        }
        with_connection(&self.db, "load scheduled workouts", |conn| {
            Ok(WeeklyWorkout::find_in_range(conn, session.user_id, from, to)?)
        })
    }

    pub fn mark_completed(&self, session: &Session, id: i64) -> Result<WeeklyWorkout, AppError> {
        let workout = with_connection(&self.db, "complete scheduled workout", |conn| {
            owned_workout(conn, session, id)?;
            WeeklyWorkout::mark_completed(conn, id, now())
        })?;
        info!("User {} completed scheduled workout {id}", session.user_id);
        Ok(workout)
    }

    pub fn delete(&self, session: &Session, id: i64) -> Result<(), AppError> {
        with_connection(&self.db, "delete scheduled workout", |conn| {
            owned_workout(conn, session, id)?;
            WeeklyWorkout::delete(conn, id)?;
            Ok(())
        })
    }

    pub fn clear_current_week(&self, session: &Session) -> Result<usize, AppError> {
        with_connection(&self.db, "clear weekly workouts", |conn| {
            Ok(WeeklyWorkout::clear_week(conn, session.user_id, now().date())?)
        })
    }

    pub fn week_progress(&self, session: &Session, date: NaiveDate) -> Result<WeekProgress, AppError> {
        with_connection(&self.db, "load week progress", |conn| {
            Ok(WeeklyWorkout::week_counts(conn, session.user_id, date)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::RoutineController;
    use crate::test_utils::{register_shared_user, setup_shared_db};

    #[test]
    fn test_schedule_current_week_and_complete() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let routines = RoutineController::new(Arc::clone(&db));
        let schedule = ScheduleController::new(Arc::clone(&db));
        let routine = routines.create_routine(&session, "Leg Day", "").unwrap();

        let today = now().date();
        let workout = schedule.add_routine_to_week(&session, routine, today).unwrap();
        assert_eq!(schedule.current_week(&session).unwrap().len(), 1);

        let done = schedule.mark_completed(&session, workout.id).unwrap();
        assert!(done.is_completed);
        assert!(done.completion_time.is_some());
        assert!(schedule.mark_completed(&session, workout.id).is_err());

        assert_eq!(
            schedule.week_progress(&session, today).unwrap(),
            WeekProgress { completed: 1, total: 1 }
        );

        assert_eq!(schedule.clear_current_week(&session).unwrap(), 1);
        assert!(schedule.current_week(&session).unwrap().is_empty());
    }

    #[test]
    fn test_today_only_returns_current_day() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let routines = RoutineController::new(Arc::clone(&db));
        let schedule = ScheduleController::new(Arc::clone(&db));
        let legs = routines.create_routine(&session, "Leg Day", "").unwrap();
        let push = routines.create_routine(&session, "Push Day", "").unwrap();

        assert!(schedule.today(&session).unwrap().is_empty());

        let today = now().date();
        schedule.add_routine_to_week(&session, legs, today).unwrap();
        schedule
            .add_routine_to_week(&session, push, today.succ_opt().unwrap())
            .unwrap();
        schedule
            .add_routine_to_week(&session, push, today.pred_opt().unwrap())
            .unwrap();

        let todays = schedule.today(&session).unwrap();
        assert_eq!(todays.len(), 1);
        let only = todays.first().unwrap();
        assert_eq!(only.routine_name, "Leg Day");
        assert_eq!(only.scheduled_date, today);
    }

    #[test]
    fn test_schedule_foreign_routine_forbidden() {
        let (db, _dir) = setup_shared_db();
        let owner = register_shared_user(&db, "lifter");
        let other = register_shared_user(&db, "runner");
        let routines = RoutineController::new(Arc::clone(&db));
        let schedule = ScheduleController::new(Arc::clone(&db));
        let routine = routines.create_routine(&owner, "Leg Day", "").unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 5, 13).unwrap();
        assert!(matches!(
            schedule.add_routine_to_week(&other, routine, date),
            Err(AppError::Forbidden { .. })
        ));

        let workout = schedule.add_routine_to_week(&owner, routine, date).unwrap();
        assert!(matches!(
            schedule.delete(&other, workout.id),
            Err(AppError::Forbidden { .. })
        ));
        schedule.delete(&owner, workout.id).unwrap();
    }

    #[test]
    fn test_in_range_rejects_reversed_dates() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let schedule = ScheduleController::new(Arc::clone(&db));
        let from = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 5, 13).unwrap();

        assert!(schedule.in_range(&session, from, to).is_err());
        assert!(schedule.in_range(&session, to, from).unwrap().is_empty());
    }
}
