// src/controllers/mod.rs
//
// Controllers - the operations screens call, one per feature area. Each owns a
// handle to the shared database and checks that rows belong to the session user.

pub mod auth;
pub mod checklist;
pub mod current_workout;
pub mod exercise;
pub mod history;
pub mod profile;
pub mod routine;
pub mod schedule;
pub mod stats;

pub use auth::AuthController;
pub use checklist::{ChecklistController, ShareMessage};
pub use current_workout::CurrentWorkoutController;
pub use exercise::ExerciseController;
pub use history::HistoryController;
pub use profile::{PreferencesUpdate, ProfileController};
pub use routine::RoutineController;
pub use schedule::ScheduleController;
pub use stats::StatsController;

use crate::db::Database;
use crate::error::AppError;
use crate::session::Session;
use std::sync::{Arc, Mutex};

/// Every controller wired to one database handle.
pub struct Controllers {
    pub auth: AuthController,
    pub profile: ProfileController,
    pub routines: RoutineController,
    pub exercises: ExerciseController,
    pub schedule: ScheduleController,
    pub checklist: ChecklistController,
    pub history: HistoryController,
    pub current: CurrentWorkoutController,
    pub stats: StatsController,
}

impl Controllers {
    pub fn new(db: &Arc<Mutex<Database>>, bcrypt_cost: u32, history_limit: u32) -> Self {
        Self {
            auth: AuthController::new(Arc::clone(db), bcrypt_cost),
            profile: ProfileController::new(Arc::clone(db)),
            routines: RoutineController::new(Arc::clone(db)),
            exercises: ExerciseController::new(Arc::clone(db)),
            schedule: ScheduleController::new(Arc::clone(db)),
            checklist: ChecklistController::new(Arc::clone(db)),
            history: HistoryController::new(Arc::clone(db), history_limit),
            current: CurrentWorkoutController::new(Arc::clone(db)),
            stats: StatsController::new(Arc::clone(db)),
        }
    }
}

/// Resolve a looked-up row to one owned by `session`.
pub(crate) fn owned<T>(
    row: Option<T>,
    owner: impl FnOnce(&T) -> i64,
    session: &Session,
    entity: &'static str,
) -> Result<T, AppError> {
    let row = row.ok_or(AppError::NotFound { entity })?;
    if owner(&row) == session.user_id {
        Ok(row)
    } else {
        Err(AppError::Forbidden { entity })
    }
}
