use crate::constants::*;
use crate::error::AppError;

/// Trim and collapse runs of whitespace into a single space.
pub fn sanitize_input(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reject text carrying SQL keywords as whole words, or statement
/// terminators and comment openers anywhere.
pub fn is_sql_safe(input: &str) -> bool {
    let lower = input.to_lowercase();

    if SQL_SEQUENCES.iter().any(|seq| lower.contains(seq)) {
        return false;
    }

    !lower
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .any(|word| SQL_KEYWORDS.contains(&word))
}

/// Injection check surfaced as an input error on `field`.
pub fn validate_safe_text(field: &'static str, text: &str) -> Result<(), AppError> {
    if is_sql_safe(text) {
        Ok(())
    } else {
        Err(AppError::invalid(field, "Invalid characters detected in input"))
    }
}

/// Validate a username: 3-20 letters, digits, hyphens or underscores.
pub fn validate_username(username: &str) -> Result<&str, AppError> {
    let err = |reason: &str| AppError::invalid("username", reason);

    if username.is_empty() {
        return Err(err("Username is required"));
    }
    let len = username.chars().count();
    if len < MIN_USERNAME_LEN {
        return Err(err(&format!(
            "Username must be at least {MIN_USERNAME_LEN} characters"
        )));
    }
    if len > MAX_USERNAME_LEN {
        return Err(err(&format!(
            "Username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(err(
            "Username can only contain letters, numbers, hyphens, and underscores",
        ));
    }
    Ok(username)
}

/// Validate an email address (basic local@domain.tld shape).
pub fn validate_email(email: &str) -> Result<&str, AppError> {
    let email = email.trim();
    let err = |reason: &str| AppError::invalid("email", reason);

    if email.is_empty() {
        return Err(err("Email is required"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(err("Email is too long"));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(err("Please enter a valid email address"));
    };
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || domain.contains("..")
        || email.chars().any(char::is_whitespace)
    {
        return Err(err("Please enter a valid email address"));
    }
    Ok(email)
}

fn check_password(field: &'static str, password: &str) -> Result<(), AppError> {
    if password.is_empty() {
        return Err(AppError::invalid(field, "Password is required"));
    }
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::invalid(
            field,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::invalid(
            field,
            format!("Password must be at most {MAX_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

/// Validate password strength (6-50 characters).
pub fn validate_password(password: &str) -> Result<(), AppError> {
    check_password("password", password)
}

/// Validate a new password together with its confirmation.
pub fn validate_password_confirmation(password: &str, confirm: &str) -> Result<(), AppError> {
    check_password("new_password", password)?;

    if confirm.is_empty() {
        return Err(AppError::invalid(
            "confirm_password",
            "Password confirmation is required",
        ));
    }
    if password != confirm {
        return Err(AppError::invalid("confirm_password", "Passwords do not match"));
    }
    Ok(())
}

fn validate_name<'a>(
    field: &'static str,
    label: &str,
    name: &'a str,
    min: usize,
    max: usize,
) -> Result<&'a str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::invalid(field, format!("{label} is required")));
    }
    let len = name.chars().count();
    if len < min {
        return Err(AppError::invalid(
            field,
            format!("{label} must be at least {min} characters"),
        ));
    }
    if len > max {
        return Err(AppError::invalid(
            field,
            format!("{label} must be at most {max} characters"),
        ));
    }
    Ok(name)
}

/// Validate routine name. Returns the trimmed name.
pub fn validate_routine_name(name: &str) -> Result<&str, AppError> {
    validate_name(
        "routine_name",
        "Routine name",
        name,
        MIN_ROUTINE_NAME_LEN,
        MAX_ROUTINE_NAME_LEN,
    )
}

/// Validate exercise name. Returns the trimmed name.
pub fn validate_exercise_name(name: &str) -> Result<&str, AppError> {
    validate_name(
        "exercise_name",
        "Exercise name",
        name,
        MIN_EXERCISE_NAME_LEN,
        MAX_EXERCISE_NAME_LEN,
    )
}

/// Validate optional free text (descriptions, notes, instructions).
pub fn validate_free_text(field: &'static str, text: &str) -> Result<(), AppError> {
    if text.chars().count() > MAX_FREE_TEXT_LEN {
        return Err(AppError::invalid(
            field,
            format!("cannot exceed {MAX_FREE_TEXT_LEN} characters"),
        ));
    }
    validate_safe_text(field, text)
}

/// Validate a sets or reps count (1-100).
pub fn validate_sets_reps(field: &'static str, value: i32) -> Result<(), AppError> {
    if value <= 0 {
        return Err(AppError::invalid(field, format!("{field} must be greater than 0")));
    }
    if value > MAX_SETS_REPS {
        return Err(AppError::invalid(
            field,
            format!("{field} cannot exceed {MAX_SETS_REPS}"),
        ));
    }
    Ok(())
}

/// Validate rest time between sets, in seconds.
pub fn validate_rest_seconds(rest_seconds: i32) -> Result<(), AppError> {
    if !(0..=MAX_REST_SECONDS).contains(&rest_seconds) {
        return Err(AppError::invalid(
            "rest_seconds",
            format!("rest must be between 0 and {MAX_REST_SECONDS} seconds"),
        ));
    }
    Ok(())
}

/// Validate a phone number used to share the equipment checklist.
/// Returns the digits only.
pub fn validate_phone_number(phone: &str) -> Result<String, AppError> {
    let err = |reason: String| AppError::invalid("phone_number", reason);

    if phone.trim().is_empty() {
        return Err(err("Phone number is required".into()));
    }
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < MIN_PHONE_DIGITS {
        return Err(err(format!(
            "Phone number must have at least {MIN_PHONE_DIGITS} digits"
        )));
    }
    if digits.len() > MAX_PHONE_DIGITS {
        return Err(err(format!(
            "Phone number must have at most {MAX_PHONE_DIGITS} digits"
        )));
    }
    Ok(digits)
}

/// Validate biometric profile values.
pub fn validate_user_details(age: i32, height_cm: f64, weight_kg: f64) -> Result<(), AppError> {
    if !(1..=MAX_AGE).contains(&age) {
        return Err(AppError::invalid("age", format!("age must be 1-{MAX_AGE}")));
    }
    if !(height_cm > 0.0 && height_cm <= MAX_HEIGHT_CM) {
        return Err(AppError::invalid(
            "height",
            format!("height must be between 0 and {MAX_HEIGHT_CM} cm"),
        ));
    }
    if !(weight_kg > 0.0 && weight_kg <= MAX_WEIGHT_KG) {
        return Err(AppError::invalid(
            "weight",
            format!("weight must be between 0 and {MAX_WEIGHT_KG} kg"),
        ));
    }
    Ok(())
}
