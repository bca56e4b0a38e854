use super::owned;
use super::routine::owned_routine;
use crate::db::{with_connection, Database};
use crate::error::{is_unique_violation, AppError};
use crate::models::{now, CurrentExercise, CurrentWorkout, ExerciseStatus, RoutineExercise, SessionStatus};
use crate::session::Session;
use log::info;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn owned_current(conn: &Connection, session: &Session, id: i64) -> Result<CurrentWorkout, AppError> {
    owned(CurrentWorkout::find_by_id(conn, id)?, |c| c.user_id, session, "Current workout")
}

/// The slot has to belong to the queued routine.
fn slot_in(conn: &Connection, current: &CurrentWorkout, slot_id: i64) -> Result<(), AppError> {
    match RoutineExercise::find_by_id(conn, slot_id)? {
        Some(slot) if slot.routine_id == current.routine_id => Ok(()),
        Some(_) | None => Err(AppError::NotFound {
            entity: "Routine exercise",
        }),
    }
}

/// Routines queued for the user's ongoing training, with per-exercise state.
pub struct CurrentWorkoutController {
    db: Arc<Mutex<Database>>,
}

impl CurrentWorkoutController {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    pub fn add(&self, session: &Session, routine_id: i64) -> Result<CurrentWorkout, AppError> {
        let current = with_connection(&self.db, "add current workout", |conn| {
            let routine = owned_routine(conn, session, routine_id)?;
            CurrentWorkout::add(conn, session.user_id, routine_id).map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::AlreadyExists { name: routine.name }
                } else {
                    e.into()
                }
            })
        })?;
        info!("User {} queued routine {routine_id}", session.user_id);
        Ok(current)
    }

    pub fn list(&self, session: &Session) -> Result<Vec<CurrentWorkout>, AppError> {
        with_connection(&self.db, "load current workouts", |conn| {
            Ok(CurrentWorkout::find_for_user(conn, session.user_id)?)
        })
    }

    pub fn set_status(&self, session: &Session, id: i64, status: SessionStatus) -> Result<CurrentWorkout, AppError> {
        with_connection(&self.db, "update current workout", |conn| {
            owned_current(conn, session, id)?;
            CurrentWorkout::set_status(conn, id, status, now())?;
            owned_current(conn, session, id)
        })
    }

    pub fn set_exercise_status(
        &self,
        session: &Session,
        id: i64,
        slot_id: i64,
        status: ExerciseStatus,
    ) -> Result<(), AppError> {
        with_connection(&self.db, "update current exercise", |conn| {
            let current = owned_current(conn, session, id)?;
            slot_in(conn, &current, slot_id)?;
            Ok(CurrentWorkout::set_exercise_status(conn, id, slot_id, status)?)
        })
    }

    /// Drop an exercise from this session without touching the routine.
    pub fn hide_exercise(&self, session: &Session, id: i64, slot_id: i64) -> Result<(), AppError> {
        with_connection(&self.db, "hide current exercise", |conn| {
            let current = owned_current(conn, session, id)?;
            slot_in(conn, &current, slot_id)?;
            Ok(CurrentWorkout::hide_exercise(conn, id, slot_id)?)
        })
    }

    pub fn exercises(&self, session: &Session, id: i64) -> Result<Vec<CurrentExercise>, AppError> {
        with_connection(&self.db, "load current exercises", |conn| {
            owned_current(conn, session, id)?;
            Ok(CurrentWorkout::exercises(conn, id)?)
        })
    }

    pub fn remove(&self, session: &Session, id: i64) -> Result<(), AppError> {
        with_connection(&self.db, "remove current workout", |conn| {
            owned_current(conn, session, id)?;
            CurrentWorkout::remove(conn, id)?;
            Ok(())
        })
    }

    pub fn clear(&self, session: &Session) -> Result<usize, AppError> {
        with_connection(&self.db, "clear current workouts", |conn| {
            Ok(CurrentWorkout::clear_for_user(conn, session.user_id)?)
        })
    }
}
