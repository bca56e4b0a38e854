// src/constants.rs

/// Minimum username length
pub const MIN_USERNAME_LEN: usize = 3;

/// Maximum username length
pub const MAX_USERNAME_LEN: usize = 20;

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Maximum password length
pub const MAX_PASSWORD_LEN: usize = 50;

/// Maximum email length (RFC 5321 path limit)
pub const MAX_EMAIL_LEN: usize = 254;

/// Minimum routine name length, after trimming
pub const MIN_ROUTINE_NAME_LEN: usize = 3;

/// Maximum routine name length, after trimming
pub const MAX_ROUTINE_NAME_LEN: usize = 50;

/// Minimum exercise name length, after trimming
pub const MIN_EXERCISE_NAME_LEN: usize = 2;

/// Maximum exercise name length, after trimming
pub const MAX_EXERCISE_NAME_LEN: usize = 50;

/// Maximum length for free-text fields (descriptions, notes, instructions)
pub const MAX_FREE_TEXT_LEN: usize = 1000;

/// Upper bound for sets and reps
pub const MAX_SETS_REPS: i32 = 100;

/// Upper bound for rest between sets, in seconds (one hour)
pub const MAX_REST_SECONDS: i32 = 60 * 60;

/// Default sets for an exercise placed in a routine
pub const DEFAULT_SETS: i32 = 1;

/// Default reps for an exercise placed in a routine
pub const DEFAULT_REPS: i32 = 1;

/// Default rest between sets, in seconds
pub const DEFAULT_REST_SECONDS: i32 = 60;

/// Default number of workout history rows returned by a listing
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Phone numbers accept 10 to 15 digits once formatting is stripped
pub const MIN_PHONE_DIGITS: usize = 10;
pub const MAX_PHONE_DIGITS: usize = 15;

/// Maximum user age accepted in the profile
pub const MAX_AGE: i32 = 120;

/// Maximum height in centimetres
pub const MAX_HEIGHT_CM: f64 = 300.0;

/// Maximum weight in kilograms
pub const MAX_WEIGHT_KG: f64 = 500.0;

/// Category assigned to equipment created on the fly from an exercise
pub const USER_EQUIPMENT_CATEGORY: &str = "accessories";

/// Description assigned to equipment created on the fly from an exercise
pub const USER_EQUIPMENT_DESCRIPTION: &str = "User-added equipment";

/// Words that mark a text field as unsafe to accept
pub const SQL_KEYWORDS: &[&str] = &[
    "select", "insert", "update", "delete", "drop", "create", "alter", "exec", "union",
];

/// Statement terminators and comment openers rejected in text fields
pub const SQL_SEQUENCES: &[&str] = &[";", "--", "/*"];
