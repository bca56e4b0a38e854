use super::owned;
use crate::db::{with_connection, Database};
use crate::error::{is_fk_violation, AppError};
use crate::models::{Exercise, ExerciseDraft};
use crate::session::Session;
use crate::validation::{
    sanitize_input, validate_exercise_name, validate_free_text, validate_rest_seconds,
    validate_safe_text, validate_sets_reps,
};
use std::sync::{Arc, Mutex};

/// Split comma-separated equipment entries, drop blanks and repeats.
pub(crate) fn split_equipment<'a>(entries: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in entries
        .into_iter()
        .flat_map(|entry| entry.split(','))
        .map(sanitize_input)
        .filter(|name| !name.is_empty())
    {
        if !names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
            names.push(name);
        }
    }
    names
}

/// Normalize and check every field of a draft before any write.
fn clean_draft(draft: &ExerciseDraft) -> Result<ExerciseDraft, AppError> {
    let name = sanitize_input(&draft.name);
    let name = validate_exercise_name(&name)?.to_string();
    validate_safe_text("exercise_name", &name)?;

    validate_sets_reps("sets", draft.sets)?;
    validate_sets_reps("reps", draft.reps)?;
    validate_rest_seconds(draft.rest_seconds)?;

    let equipment = split_equipment(&draft.equipment);
    for item in &equipment {
        validate_safe_text("equipment", item)?;
    }

    let instructions: Vec<String> = draft
        .instructions
        .iter()
        .map(|step| step.trim().to_string())
        .filter(|step| !step.is_empty())
        .collect();
    for step in &instructions {
        validate_free_text("instructions", step)?;
    }

    let image_path = draft
        .image_path
        .as_deref()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(ToString::to_string);

    Ok(ExerciseDraft {
        name,
        sets: draft.sets,
        reps: draft.reps,
        rest_seconds: draft.rest_seconds,
        image_path,
        equipment,
        instructions,
    })
}

pub struct ExerciseController {
    db: Arc<Mutex<Database>>,
}

impl ExerciseController {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    pub fn create_exercise(&self, session: &Session, draft: &ExerciseDraft) -> Result<Exercise, AppError> {
        let draft = clean_draft(draft)?;

        with_connection(&self.db, "create exercise", |conn| {
            if Exercise::name_exists(conn, session.user_id, &draft.name, None)? {
                return Err(AppError::AlreadyExists { name: draft.name.clone() });
            }
            Ok(Exercise::create(conn, session.user_id, &draft)?)
        })
    }

    pub fn update_exercise(
        &self,
        session: &Session,
        id: i64,
        draft: &ExerciseDraft,
    ) -> Result<Exercise, AppError> {
        let draft = clean_draft(draft)?;

        with_connection(&self.db, "update exercise", |conn| {
            owned(Exercise::find_by_id(conn, id)?, |e| e.user_id, session, "Exercise")?;
            if Exercise::name_exists(conn, session.user_id, &draft.name, Some(id))? {
                return Err(AppError::AlreadyExists { name: draft.name.clone() });
            }
            Exercise::update(conn, id, &draft)?;
            Exercise::find_by_id(conn, id)?.ok_or(AppError::NotFound { entity: "Exercise" })
        })
    }

    pub fn delete_exercise(&self, session: &Session, id: i64) -> Result<(), AppError> {
        with_connection(&self.db, "delete exercise", |conn| {
            owned(Exercise::find_by_id(conn, id)?, |e| e.user_id, session, "Exercise")?;
            match Exercise::delete(conn, id) {
                Ok(_) => Ok(()),
                Err(e) if is_fk_violation(&e) => Err(AppError::DeleteFailed {
                    reason: "exercise is used by routines or workout history".into(),
                }),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// `None` when the id is unknown or belongs to someone else.
    pub fn get_exercise(&self, session: &Session, id: i64) -> Result<Option<Exercise>, AppError> {
        with_connection(&self.db, "load exercise", |conn| {
            Ok(Exercise::find_by_id(conn, id)?.filter(|e| e.user_id == session.user_id))
        })
    }

    pub fn user_exercises(&self, session: &Session) -> Result<Vec<Exercise>, AppError> {
        with_connection(&self.db, "load exercises", |conn| {
            Ok(Exercise::find_for_user(conn, session.user_id)?)
        })
    }

    pub fn search_exercises(&self, session: &Session, query: &str) -> Result<Vec<Exercise>, AppError> {
        let query = sanitize_input(query);
        if query.is_empty() {
            return self.user_exercises(session);
        }
        validate_safe_text("query", &query)?;

        with_connection(&self.db, "search exercises", |conn| {
            Ok(Exercise::search(conn, session.user_id, &query)?)
        })
    }

    pub fn exercises_by_equipment(&self, session: &Session, equipment: &str) -> Result<Vec<Exercise>, AppError> {
        let equipment = sanitize_input(equipment);
        validate_safe_text("equipment", &equipment)?;

        with_connection(&self.db, "load exercises by equipment", |conn| {
            Ok(Exercise::find_by_equipment(conn, session.user_id, &equipment)?)
        })
    }

    pub fn recent_exercises(&self, session: &Session, limit: u32) -> Result<Vec<Exercise>, AppError> {
        with_connection(&self.db, "load recent exercises", |conn| {
            Ok(Exercise::recent(conn, session.user_id, limit)?)
        })
    }

    pub fn exercise_count(&self, session: &Session) -> Result<i64, AppError> {
        with_connection(&self.db, "count exercises", |conn| {
            Ok(Exercise::count_for_user(conn, session.user_id)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::RoutineController;
    use crate::test_utils::{register_shared_user, setup_shared_db};

    fn draft(name: &str, equipment: &[&str]) -> ExerciseDraft {
        ExerciseDraft {
            equipment: equipment.iter().map(ToString::to_string).collect(),
            ..ExerciseDraft::new(name)
        }
    }

    #[test]
    fn test_split_equipment_dedupes_comma_lists() {
        let entries = vec!["Dumbbells, Weight Bench".to_string(), "dumbbells".into(), " ".into()];
        assert_eq!(split_equipment(&entries), vec!["Dumbbells", "Weight Bench"]);
    }

    #[test]
    fn test_create_exercise_cleans_input() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let exercises = ExerciseController::new(Arc::clone(&db));

        let mut d = draft("  Bench   Press ", &["Barbell, Weight Bench"]);
        d.instructions = vec!["Unrack".into(), "  ".into(), "Press".into()];
        let created = exercises.create_exercise(&session, &d).unwrap();

        assert_eq!(created.name, "Bench Press");
        assert_eq!(created.equipment, vec!["Barbell", "Weight Bench"]);
        assert_eq!(created.instructions, vec!["Unrack", "Press"]);
    }

    #[test]
    fn test_create_exercise_rejects_bad_input() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let exercises = ExerciseController::new(Arc::clone(&db));

        let mut d = draft("Curl", &[]);
        d.reps = 101;
        assert!(matches!(
            exercises.create_exercise(&session, &d),
            Err(AppError::InvalidInput { field: "reps", .. })
        ));
        assert!(exercises.create_exercise(&session, &draft("drop table x", &[])).is_err());

        exercises.create_exercise(&session, &draft("Curl", &[])).unwrap();
        assert!(matches!(
            exercises.create_exercise(&session, &draft("curl", &[])),
            Err(AppError::AlreadyExists { .. })
        ));
        assert_eq!(exercises.exercise_count(&session).unwrap(), 1);
    }

    #[test]
    fn test_update_and_queries() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let exercises = ExerciseController::new(Arc::clone(&db));

        let squat = exercises.create_exercise(&session, &draft("Squat", &["Barbell"])).unwrap();
        exercises.create_exercise(&session, &draft("Push-up", &[])).unwrap();

        let updated = exercises
            .update_exercise(&session, squat.id, &draft("Front Squat", &["Barbell"]))
            .unwrap();
        assert_eq!(updated.name, "Front Squat");

        assert_eq!(exercises.search_exercises(&session, "squat").unwrap().len(), 1);
        assert_eq!(exercises.search_exercises(&session, "").unwrap().len(), 2);
        assert_eq!(exercises.exercises_by_equipment(&session, "Barbell").unwrap().len(), 1);
        assert_eq!(exercises.recent_exercises(&session, 1).unwrap().len(), 1);
        assert_eq!(exercises.user_exercises(&session).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_exercise_in_use_fails() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let exercises = ExerciseController::new(Arc::clone(&db));
        let routines = RoutineController::new(Arc::clone(&db));

        let squat = exercises.create_exercise(&session, &draft("Squat", &[])).unwrap();
        let routine = routines.create_routine(&session, "Leg Day", "").unwrap();
        routines.add_exercise(&session, routine, squat.id, None).unwrap();

        assert!(matches!(
            exercises.delete_exercise(&session, squat.id),
            Err(AppError::DeleteFailed { .. })
        ));
        assert!(exercises.get_exercise(&session, squat.id).unwrap().is_some());

        routines.delete_routine(&session, routine).unwrap();
        exercises.delete_exercise(&session, squat.id).unwrap();
        assert!(exercises.get_exercise(&session, squat.id).unwrap().is_none());
    }

    #[test]
    fn test_foreign_exercise_is_hidden_and_protected() {
        let (db, _dir) = setup_shared_db();
        let owner = register_shared_user(&db, "lifter");
        let other = register_shared_user(&db, "runner");
        let exercises = ExerciseController::new(Arc::clone(&db));
        let squat = exercises.create_exercise(&owner, &draft("Squat", &[])).unwrap();

        assert!(exercises.get_exercise(&other, squat.id).unwrap().is_none());
        assert!(matches!(
            exercises.delete_exercise(&other, squat.id),
            Err(AppError::Forbidden { .. })
        ));
    }
}
