pub mod current_workout;
pub mod equipment;
pub mod equipment_checklist;
pub mod exercise;
pub mod preferences;
pub mod routine;
pub mod user;
pub mod user_stats;
pub mod weekly_workout;
pub mod workout_history;

pub use current_workout::{CurrentExercise, CurrentWorkout, ExerciseStatus, SessionStatus};
pub use equipment::Equipment;
pub use equipment_checklist::{ChecklistGroup, ChecklistItem, ChecklistStats};
pub use exercise::{Exercise, ExerciseDraft};
pub use preferences::{Sensitivity, Theme, Units, UserPreferences};
pub use routine::{ExerciseTargets, Routine, RoutineExercise, WorkoutSummary};
pub use user::{User, UserDetails};
pub use user_stats::UserStats;
pub use weekly_workout::{WeekProgress, WeeklyWorkout};
pub use workout_history::{ExerciseCompletion, HistoryTotals, WorkoutHistory};

use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime, Timelike};

/// Local wall-clock time truncated to whole seconds.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-05-15 is a Wednesday
        assert_eq!(week_start(date(2024, 5, 15)), date(2024, 5, 13));
        assert_eq!(week_start(date(2024, 5, 13)), date(2024, 5, 13));
        // Sunday belongs to the week that started six days earlier
        assert_eq!(week_start(date(2024, 5, 19)), date(2024, 5, 13));
    }

    #[test]
    fn test_now_has_no_subsecond_part() {
        assert_eq!(now().nanosecond(), 0);
    }
}
