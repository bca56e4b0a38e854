use super::owned;
use super::routine::owned_routine;
use crate::constants::MAX_WEIGHT_KG;
use crate::db::{with_connection, Database};
use crate::error::AppError;
use crate::models::{now, Exercise, ExerciseCompletion, HistoryTotals, WorkoutHistory};
use crate::session::Session;
use crate::validation::{sanitize_input, validate_free_text, validate_sets_reps};
use chrono::NaiveDate;
use log::info;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn owned_history(conn: &Connection, session: &Session, id: i64) -> Result<WorkoutHistory, AppError> {
    owned(WorkoutHistory::find_by_id(conn, id)?, |h| h.user_id, session, "Workout")
}

fn validate_weight(weight: Option<f64>) -> Result<(), AppError> {
    match weight {
        Some(w) if !w.is_finite() || w < 0.0 => Err(AppError::invalid("weight_used", "Weight cannot be negative")),
        Some(w) if w > MAX_WEIGHT_KG => Err(AppError::invalid(
            "weight_used",
            format!("Weight cannot exceed {MAX_WEIGHT_KG} kg"),
        )),
        Some(_) | None => Ok(()),
    }
}

/// Performed workouts and the exercises logged during them.
pub struct HistoryController {
    db: Arc<Mutex<Database>>,
    default_limit: u32,
}

impl HistoryController {
    pub fn new(db: Arc<Mutex<Database>>, default_limit: u32) -> Self {
        Self { db, default_limit }
    }

    /// Open a workout, optionally tied to one of the user's routines.
    pub fn start_workout(&self, session: &Session, routine_id: Option<i64>) -> Result<WorkoutHistory, AppError> {
        let history = with_connection(&self.db, "start workout", |conn| {
            if let Some(routine_id) = routine_id {
                owned_routine(conn, session, routine_id)?;
            }
            Ok(WorkoutHistory::start(conn, session.user_id, routine_id, now())?)
        })?;
        info!("User {} started workout {}", session.user_id, history.id);
        Ok(history)
    }

    pub fn record_completion(
        &self,
        session: &Session,
        history_id: i64,
        exercise_id: i64,
        sets_completed: i32,
        reps_completed: i32,
        weight_used: Option<f64>,
    ) -> Result<ExerciseCompletion, AppError> {
        validate_sets_reps("sets", sets_completed)?;
        validate_sets_reps("reps", reps_completed)?;
        validate_weight(weight_used)?;

        with_connection(&self.db, "record exercise completion", |conn| {
            owned_history(conn, session, history_id)?;
            owned(Exercise::find_by_id(conn, exercise_id)?, |e| e.user_id, session, "Exercise")?;
            ExerciseCompletion::record(
                conn,
                history_id,
                exercise_id,
                sets_completed,
                reps_completed,
                weight_used,
                now(),
            )
        })
    }

    pub fn finish_workout(&self, session: &Session, id: i64, notes: &str) -> Result<WorkoutHistory, AppError> {
        let notes = sanitize_input(notes);
        validate_free_text("notes", &notes)?;

        let history = with_connection(&self.db, "finish workout", |conn| {
            owned_history(conn, session, id)?;
            WorkoutHistory::finish(conn, id, now(), &notes)
        })?;
        info!(
            "User {} finished workout {id} after {} minutes",
            session.user_id, history.total_duration_minutes
        );
        Ok(history)
    }

    /// Newest first. Falls back to the configured limit.
    pub fn history(&self, session: &Session, limit: Option<u32>) -> Result<Vec<WorkoutHistory>, AppError> {
        let limit = limit.filter(|l| *l > 0).unwrap_or(self.default_limit);
        with_connection(&self.db, "load workout history", |conn| {
            Ok(WorkoutHistory::find_for_user(conn, session.user_id, limit)?)
        })
    }

    pub fn in_range(
        &self,
        session: &Session,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WorkoutHistory>, AppError> {
        if from > to {
            return Err(AppError::invalid("date_range", "Start date must not be after end date"));
        }
        with_connection(&self.db, "load workout history range", |conn| {
            Ok(WorkoutHistory::find_in_range(conn, session.user_id, from, to)?)
        })
    }

    /// `None` when the id is unknown or belongs to someone else.
    pub fn get(&self, session: &Session, id: i64) -> Result<Option<WorkoutHistory>, AppError> {
        with_connection(&self.db, "load workout", |conn| {
            Ok(WorkoutHistory::find_by_id(conn, id)?.filter(|h| h.user_id == session.user_id))
        })
    }

    pub fn totals(&self, session: &Session) -> Result<HistoryTotals, AppError> {
        with_connection(&self.db, "load history totals", |conn| {
            Ok(WorkoutHistory::totals(conn, session.user_id)?)
        })
    }

    pub fn delete(&self, session: &Session, id: i64) -> Result<(), AppError> {
        with_connection(&self.db, "delete workout", |conn| {
            owned_history(conn, session, id)?;
            WorkoutHistory::delete(conn, id)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::{ExerciseController, RoutineController};
    use crate::models::ExerciseDraft;
    use crate::test_utils::{register_shared_user, setup_shared_db};

    #[test]
    fn test_workout_lifecycle() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let routines = RoutineController::new(Arc::clone(&db));
        let exercises = ExerciseController::new(Arc::clone(&db));
        let history = HistoryController::new(Arc::clone(&db), 50);

        let routine = routines.create_routine(&session, "Leg Day", "").unwrap();
        let squat = exercises.create_exercise(&session, &ExerciseDraft::new("Squat")).unwrap();
        routines.add_exercise(&session, routine, squat.id, None).unwrap();

        let workout = history.start_workout(&session, Some(routine)).unwrap();
        assert!(!workout.is_finished());
        assert_eq!(workout.routine_name.as_deref(), Some("Leg Day"));

        let done = history
            .record_completion(&session, workout.id, squat.id, 3, 10, Some(60.0))
            .unwrap();
        assert_eq!(done.exercise_name, "Squat");

        let finished = history.finish_workout(&session, workout.id, " felt strong ").unwrap();
        assert!(finished.is_finished());
        assert_eq!(finished.exercises_completed, 1);
        assert_eq!(finished.notes, "felt strong");

        assert!(history.finish_workout(&session, workout.id, "").is_err());
        assert!(history
            .record_completion(&session, workout.id, squat.id, 1, 1, None)
            .is_err());

        let totals = history.totals(&session).unwrap();
        assert_eq!(totals.workouts, 1);
        assert_eq!(totals.exercises, 1);
    }

    #[test]
    fn test_record_completion_validates() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let exercises = ExerciseController::new(Arc::clone(&db));
        let history = HistoryController::new(Arc::clone(&db), 50);
        let squat = exercises.create_exercise(&session, &ExerciseDraft::new("Squat")).unwrap();
        let workout = history.start_workout(&session, None).unwrap();

        assert!(matches!(
            history.record_completion(&session, workout.id, squat.id, 0, 10, None),
            Err(AppError::InvalidInput { field: "sets", .. })
        ));
        assert!(matches!(
            history.record_completion(&session, workout.id, squat.id, 3, 10, Some(-1.0)),
            Err(AppError::InvalidInput { field: "weight_used", .. })
        ));
        assert!(matches!(
            history.record_completion(&session, 9999, squat.id, 3, 10, None),
            Err(AppError::NotFound { .. })
        ));
    }

    #[test]
    fn test_history_limit_and_ownership() {
        let (db, _dir) = setup_shared_db();
        let owner = register_shared_user(&db, "lifter");
        let other = register_shared_user(&db, "runner");
        let history = HistoryController::new(Arc::clone(&db), 2);

        for _ in 0..3 {
            history.start_workout(&owner, None).unwrap();
        }
        assert_eq!(history.history(&owner, None).unwrap().len(), 2);
        assert_eq!(history.history(&owner, Some(10)).unwrap().len(), 3);
        assert!(history.history(&other, None).unwrap().is_empty());

        let first = history.history(&owner, Some(1)).unwrap().remove(0);
        assert!(history.get(&other, first.id).unwrap().is_none());
        assert!(matches!(
            history.delete(&other, first.id),
            Err(AppError::Forbidden { .. })
        ));
        history.delete(&owner, first.id).unwrap();
        assert!(history.get(&owner, first.id).unwrap().is_none());
    }

    #[test]
    fn test_in_range_covers_today() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let history = HistoryController::new(Arc::clone(&db), 50);
        history.start_workout(&session, None).unwrap();

        let today = now().date();
        assert_eq!(history.in_range(&session, today, today).unwrap().len(), 1);
        assert!(history.in_range(&session, today, today.pred_opt().unwrap()).is_err());
    }
}
