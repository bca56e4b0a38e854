pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS user_details (
    user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    age INTEGER NOT NULL DEFAULT 0,
    gender TEXT NOT NULL DEFAULT '',
    height_cm REAL NOT NULL DEFAULT 0,
    weight_kg REAL NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS user_preferences (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    theme TEXT NOT NULL DEFAULT 'light',
    notifications_enabled INTEGER NOT NULL DEFAULT 1,
    default_rest_seconds INTEGER NOT NULL DEFAULT 60,
    units TEXT NOT NULL DEFAULT 'metric',
    shake_sensitivity INTEGER NOT NULL DEFAULT 2
);

CREATE TABLE IF NOT EXISTS equipment (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    category TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS exercises (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    sets INTEGER NOT NULL DEFAULT 1,
    reps INTEGER NOT NULL DEFAULT 1,
    rest_seconds INTEGER NOT NULL DEFAULT 60,
    image_path TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS exercise_equipment (
    exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
    equipment_id INTEGER NOT NULL REFERENCES equipment(id),
    position INTEGER NOT NULL,
    PRIMARY KEY (exercise_id, equipment_id)
);

CREATE TABLE IF NOT EXISTS exercise_instructions (
    id INTEGER PRIMARY KEY,
    exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    instruction TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS routines (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS routine_exercises (
    id INTEGER PRIMARY KEY,
    routine_id INTEGER NOT NULL REFERENCES routines(id) ON DELETE CASCADE,
    exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE RESTRICT,
    position INTEGER NOT NULL,
    sets INTEGER NOT NULL DEFAULT 1,
    reps INTEGER NOT NULL DEFAULT 1,
    rest_seconds INTEGER NOT NULL DEFAULT 60
);

CREATE TABLE IF NOT EXISTS weekly_workouts (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    routine_id INTEGER NOT NULL REFERENCES routines(id) ON DELETE CASCADE,
    scheduled_date TEXT NOT NULL,
    week_start_date TEXT NOT NULL,
    is_completed INTEGER NOT NULL DEFAULT 0,
    completion_time TEXT
);

CREATE TABLE IF NOT EXISTS weekly_equipment_checklist (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    equipment_id INTEGER NOT NULL REFERENCES equipment(id),
    week_start_date TEXT NOT NULL,
    is_obtained INTEGER NOT NULL DEFAULT 0,
    notes TEXT NOT NULL DEFAULT '',
    UNIQUE (user_id, equipment_id, week_start_date)
);

CREATE TABLE IF NOT EXISTS workout_history (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    routine_id INTEGER REFERENCES routines(id) ON DELETE SET NULL,
    workout_date TEXT NOT NULL,
    start_time TEXT NOT NULL,
    completion_time TEXT,
    total_duration_minutes INTEGER NOT NULL DEFAULT 0,
    exercises_completed INTEGER NOT NULL DEFAULT 0,
    notes TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS exercise_completions (
    id INTEGER PRIMARY KEY,
    history_id INTEGER NOT NULL REFERENCES workout_history(id) ON DELETE CASCADE,
    exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE RESTRICT,
    sets_completed INTEGER NOT NULL,
    reps_completed INTEGER NOT NULL,
    weight_used REAL,
    completion_time TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS current_workouts (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    routine_id INTEGER NOT NULL REFERENCES routines(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'pending',
    started_at TEXT,
    UNIQUE (user_id, routine_id)
);

CREATE TABLE IF NOT EXISTS current_workout_exercise_status (
    current_workout_id INTEGER NOT NULL REFERENCES current_workouts(id) ON DELETE CASCADE,
    routine_exercise_id INTEGER NOT NULL REFERENCES routine_exercises(id) ON DELETE CASCADE,
    status TEXT NOT NULL,
    PRIMARY KEY (current_workout_id, routine_exercise_id)
);

CREATE TABLE IF NOT EXISTS current_workout_hidden_exercises (
    current_workout_id INTEGER NOT NULL REFERENCES current_workouts(id) ON DELETE CASCADE,
    routine_exercise_id INTEGER NOT NULL REFERENCES routine_exercises(id) ON DELETE CASCADE,
    PRIMARY KEY (current_workout_id, routine_exercise_id)
);

CREATE TABLE IF NOT EXISTS app_session (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_exercises_user ON exercises(user_id);
CREATE INDEX IF NOT EXISTS idx_routines_user ON routines(user_id);
CREATE INDEX IF NOT EXISTS idx_routine_exercises_routine ON routine_exercises(routine_id, position);
CREATE INDEX IF NOT EXISTS idx_weekly_workouts_week ON weekly_workouts(user_id, week_start_date);
CREATE INDEX IF NOT EXISTS idx_checklist_week ON weekly_equipment_checklist(user_id, week_start_date);
CREATE INDEX IF NOT EXISTS idx_history_user_date ON workout_history(user_id, workout_date);
CREATE INDEX IF NOT EXISTS idx_completions_history ON exercise_completions(history_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_completions_unique ON exercise_completions(history_id, exercise_id);
";

/// Catalog seeded into an empty `equipment` table: (name, category, description).
pub const DEFAULT_EQUIPMENT: &[(&str, &str, &str)] = &[
    // strength
    ("Dumbbells", "strength", "Various weight dumbbells"),
    ("Barbell", "strength", "Olympic barbell with plates"),
    ("Kettlebells", "strength", "Assorted kettlebells"),
    ("Resistance Bands", "strength", "Set of resistance bands"),
    ("Pull-up Bar", "strength", "Doorway or wall-mounted pull-up bar"),
    ("Weight Bench", "strength", "Adjustable weight bench"),
    // cardio
    ("Jump Rope", "cardio", "Speed jump rope"),
    ("Treadmill", "cardio", "Motorized treadmill"),
    ("Stationary Bike", "cardio", "Indoor cycling bike"),
    ("Rowing Machine", "cardio", "Indoor rowing machine"),
    // flexibility
    ("Yoga Mat", "flexibility", "Non-slip yoga mat"),
    ("Yoga Blocks", "flexibility", "Foam yoga blocks"),
    ("Yoga Straps", "flexibility", "Stretching strap"),
    ("Foam Roller", "flexibility", "Muscle recovery foam roller"),
    // accessories
    ("Water Bottle", "accessories", "Reusable water bottle"),
    ("Workout Towel", "accessories", "Sweat towel"),
    ("Gym Gloves", "accessories", "Grip training gloves"),
    ("Heart Rate Monitor", "accessories", "Chest strap or wrist monitor"),
];
