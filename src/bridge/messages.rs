use crate::controllers::PreferencesUpdate;
use crate::error::ErrorKind;
use crate::flows::ProfileEvent;
use crate::models::{ExerciseDraft, ExerciseStatus, ExerciseTargets, SessionStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One call from the UI shell. Dates are `YYYY-MM-DD`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    // Account
    Register {
        username: String,
        email: String,
        password: String,
    },
    Login {
        login: String,
        password: String,
    },
    Logout,
    Status,
    UpdateUsername {
        username: String,
    },
    ChangePassword {
        current: String,
        new: String,
        confirm: String,
    },

    // Profile
    GetDetails,
    SaveDetails {
        age: i32,
        #[serde(default)]
        gender: String,
        height_cm: f64,
        weight_kg: f64,
    },
    GetPreferences,
    SavePreferences {
        preferences: PreferencesUpdate,
    },
    ToggleTheme,

    // Routines
    /// Goes through the routine editor: `routine_id` selects edit mode.
    SaveRoutine {
        routine_id: Option<i64>,
        name: String,
        #[serde(default)]
        description: String,
    },
    CreateRoutine {
        name: String,
        #[serde(default)]
        description: String,
    },
    UpdateRoutine {
        routine_id: i64,
        name: String,
        #[serde(default)]
        description: String,
    },
    GetRoutine {
        routine_id: i64,
    },
    ListRoutines,
    DeleteRoutine {
        routine_id: i64,
    },
    AddRoutineExercise {
        routine_id: i64,
        exercise_id: i64,
        targets: Option<ExerciseTargets>,
    },
    UpdateRoutineExercise {
        slot_id: i64,
        targets: ExerciseTargets,
    },
    RemoveRoutineExercise {
        slot_id: i64,
    },
    ReorderRoutineExercise {
        slot_id: i64,
        position: usize,
    },
    WorkoutSummaries,

    // Exercises
    CreateExercise {
        exercise: ExerciseDraft,
    },
    UpdateExercise {
        exercise_id: i64,
        exercise: ExerciseDraft,
    },
    DeleteExercise {
        exercise_id: i64,
    },
    GetExercise {
        exercise_id: i64,
    },
    ListExercises,
    SearchExercises {
        query: String,
    },
    ExercisesByEquipment {
        equipment: String,
    },
    RecentExercises {
        limit: u32,
    },
    ExerciseCount,

    // Weekly schedule
    ScheduleRoutine {
        routine_id: i64,
        date: NaiveDate,
    },
    CurrentWeek,
    ScheduledToday,
    Week {
        date: NaiveDate,
    },
    ScheduledInRange {
        from: NaiveDate,
        to: NaiveDate,
    },
    CompleteScheduled {
        workout_id: i64,
    },
    DeleteScheduled {
        workout_id: i64,
    },
    ClearCurrentWeek,
    WeekProgress {
        date: NaiveDate,
    },

    // Equipment checklist
    GenerateChecklist {
        routine_ids: Vec<i64>,
        date: NaiveDate,
    },
    Checklist {
        date: NaiveDate,
    },
    SetObtained {
        item_id: i64,
        obtained: bool,
    },
    SetChecklistNotes {
        item_id: i64,
        notes: String,
    },
    ChecklistStats {
        date: NaiveDate,
    },
    EquipmentCategories,
    EquipmentCatalog,
    ShareText {
        date: NaiveDate,
    },
    ShareMessage {
        date: NaiveDate,
        phone_number: String,
    },

    // Workout history
    StartWorkout {
        routine_id: Option<i64>,
    },
    RecordCompletion {
        history_id: i64,
        exercise_id: i64,
        sets_completed: i32,
        reps_completed: i32,
        weight_used: Option<f64>,
    },
    FinishWorkout {
        history_id: i64,
        #[serde(default)]
        notes: String,
    },
    History {
        limit: Option<u32>,
    },
    HistoryInRange {
        from: NaiveDate,
        to: NaiveDate,
    },
    GetWorkout {
        history_id: i64,
    },
    HistoryTotals,
    DeleteWorkout {
        history_id: i64,
    },

    // Current workouts
    QueueRoutine {
        routine_id: i64,
    },
    CurrentWorkouts,
    SetCurrentStatus {
        current_id: i64,
        status: SessionStatus,
    },
    SetCurrentExerciseStatus {
        current_id: i64,
        slot_id: i64,
        status: ExerciseStatus,
    },
    HideCurrentExercise {
        current_id: i64,
        slot_id: i64,
    },
    CurrentExercises {
        current_id: i64,
    },
    RemoveCurrent {
        current_id: i64,
    },
    ClearCurrent,

    UserStats,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok {
        data: Value,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        events: Vec<ProfileEvent>,
    },
    Error {
        kind: ErrorKind,
        field: Option<&'static str>,
        message: String,
    },
}

impl Response {
    pub fn ok(data: Value) -> Self {
        Self::Ok {
            data,
            events: Vec::new(),
        }
    }
}
