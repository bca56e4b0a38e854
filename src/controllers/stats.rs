use crate::db::{with_connection, Database};
use crate::error::AppError;
use crate::models::UserStats;
use crate::session::Session;
use std::sync::{Arc, Mutex};

pub struct StatsController {
    db: Arc<Mutex<Database>>,
}

impl StatsController {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    pub fn user_stats(&self, session: &Session) -> Result<UserStats, AppError> {
        with_connection(&self.db, "load user stats", |conn| {
            Ok(UserStats::compute(conn, session.user_id)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::{ExerciseController, HistoryController, RoutineController};
    use crate::models::ExerciseDraft;
    use crate::test_utils::{register_shared_user, setup_shared_db};

    #[test]
    fn test_user_stats_follow_activity() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let stats = StatsController::new(Arc::clone(&db));
        let routines = RoutineController::new(Arc::clone(&db));
        let exercises = ExerciseController::new(Arc::clone(&db));
        let history = HistoryController::new(Arc::clone(&db), 50);

        assert_eq!(stats.user_stats(&session).unwrap().total_sessions, 0);

        let routine = routines.create_routine(&session, "Leg Day", "").unwrap();
        let squat = exercises.create_exercise(&session, &ExerciseDraft::new("Squat")).unwrap();
        routines.add_exercise(&session, routine, squat.id, None).unwrap();
        history.start_workout(&session, Some(routine)).unwrap();
        history.start_workout(&session, None).unwrap();

        let s = stats.user_stats(&session).unwrap();
        assert_eq!(s.total_routines, 1);
        assert_eq!(s.total_exercises, 1);
        assert_eq!(s.total_sessions, 2);
        assert_eq!(s.active_days, 1);
    }
}
