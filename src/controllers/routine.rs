use super::owned;
use crate::db::{with_connection, Database};
use crate::error::AppError;
use crate::models::{Exercise, ExerciseTargets, Routine, RoutineExercise, WorkoutSummary};
use crate::session::Session;
use crate::validation::{
    sanitize_input, validate_free_text, validate_rest_seconds, validate_routine_name,
    validate_safe_text, validate_sets_reps,
};
use log::info;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Sanitize and check a routine's name and description before any write.
fn clean_routine_input(name: &str, description: &str) -> Result<(String, String), AppError> {
    let name = sanitize_input(name);
    let name = validate_routine_name(&name)?.to_string();
    validate_safe_text("routine_name", &name)?;

    let description = sanitize_input(description);
    validate_free_text("description", &description)?;

    Ok((name, description))
}

pub(crate) fn validate_targets(targets: &ExerciseTargets) -> Result<(), AppError> {
    validate_sets_reps("sets", targets.sets)?;
    validate_sets_reps("reps", targets.reps)?;
    validate_rest_seconds(targets.rest_seconds)
}

pub(crate) fn owned_routine(conn: &Connection, session: &Session, id: i64) -> Result<Routine, AppError> {
    owned(Routine::find_by_id(conn, id)?, |r| r.user_id, session, "Routine")
}

/// Resolve a routine slot through its routine's owner.
fn owned_slot(conn: &Connection, session: &Session, id: i64) -> Result<RoutineExercise, AppError> {
    let slot = RoutineExercise::find_by_id(conn, id)?.ok_or(AppError::NotFound {
        entity: "Routine exercise",
    })?;
    owned_routine(conn, session, slot.routine_id)?;
    Ok(slot)
}

pub struct RoutineController {
    db: Arc<Mutex<Database>>,
}

impl RoutineController {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    /// Create a routine and return its id.
    pub fn create_routine(&self, session: &Session, name: &str, description: &str) -> Result<i64, AppError> {
        let (name, description) = clean_routine_input(name, description)?;

        let routine = with_connection(&self.db, "create routine", |conn| {
            Ok(Routine::create(conn, session.user_id, &name, &description)?)
        })?;

        info!("User {} created routine {}", session.user_id, routine.id);
        Ok(routine.id)
    }

    pub fn update_routine(
        &self,
        session: &Session,
        id: i64,
        name: &str,
        description: &str,
    ) -> Result<(), AppError> {
        let (name, description) = clean_routine_input(name, description)?;

        with_connection(&self.db, "update routine", |conn| {
            owned_routine(conn, session, id)?;
            Routine::update(conn, id, &name, &description)?;
            Ok(())
        })
    }

    /// `None` when the id is unknown or belongs to someone else.
    pub fn get_routine_by_id(&self, session: &Session, id: i64) -> Result<Option<Routine>, AppError> {
        with_connection(&self.db, "load routine", |conn| {
            Ok(Routine::find_by_id(conn, id)?.filter(|r| r.user_id == session.user_id))
        })
    }

    pub fn user_routines(&self, session: &Session) -> Result<Vec<Routine>, AppError> {
        with_connection(&self.db, "load routines", |conn| {
            Ok(Routine::find_for_user(conn, session.user_id)?)
        })
    }

    pub fn delete_routine(&self, session: &Session, id: i64) -> Result<(), AppError> {
        with_connection(&self.db, "delete routine", |conn| {
            owned_routine(conn, session, id)?;
            Routine::delete(conn, id)?;
            Ok(())
        })?;
        info!("User {} deleted routine {id}", session.user_id);
        Ok(())
    }

    /// Append one of the user's exercises to a routine.
    pub fn add_exercise(
        &self,
        session: &Session,
        routine_id: i64,
        exercise_id: i64,
        targets: Option<ExerciseTargets>,
    ) -> Result<RoutineExercise, AppError> {
        if let Some(targets) = &targets {
            validate_targets(targets)?;
        }

        with_connection(&self.db, "add exercise to routine", |conn| {
            owned_routine(conn, session, routine_id)?;
            owned(Exercise::find_by_id(conn, exercise_id)?, |e| e.user_id, session, "Exercise")?;
            Ok(RoutineExercise::add(conn, routine_id, exercise_id, targets)?)
        })
    }

    pub fn update_routine_exercise(
        &self,
        session: &Session,
        slot_id: i64,
        targets: ExerciseTargets,
    ) -> Result<(), AppError> {
        validate_targets(&targets)?;

        with_connection(&self.db, "update routine exercise", |conn| {
            owned_slot(conn, session, slot_id)?;
            RoutineExercise::update_targets(conn, slot_id, targets)?;
            Ok(())
        })
    }

    pub fn remove_routine_exercise(&self, session: &Session, slot_id: i64) -> Result<(), AppError> {
        with_connection(&self.db, "remove routine exercise", |conn| {
            owned_slot(conn, session, slot_id)?;
            RoutineExercise::remove(conn, slot_id)?;
            Ok(())
        })
    }

    pub fn reorder_routine_exercise(
        &self,
        session: &Session,
        slot_id: i64,
        position: usize,
    ) -> Result<Vec<RoutineExercise>, AppError> {
        with_connection(&self.db, "reorder routine exercise", |conn| {
            let slot = owned_slot(conn, session, slot_id)?;
            RoutineExercise::move_to(conn, slot_id, position)?;
            Ok(RoutineExercise::find_for_routine(conn, slot.routine_id)?)
        })
    }

    pub fn workout_summaries(&self, session: &Session) -> Result<Vec<WorkoutSummary>, AppError> {
        with_connection(&self.db, "load workouts", |conn| {
            Ok(WorkoutSummary::list_for_user(conn, session.user_id)?)
        })
    }
}
