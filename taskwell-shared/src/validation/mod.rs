/// Input validation
///
/// Pure functions that turn untrusted request input into typed, cleaned
/// values. Each validator checks every field in one pass and returns either
/// the cleaned value or the full list of human-readable error messages.
/// Nothing here touches the database.
///
/// # Modules
///
/// - `task`: Task create/update bodies and list query parameters
/// - `account`: Email, password and free-text fields
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use taskwell_shared::validation::task::validate_task_create;
///
/// let errors = validate_task_create(&json!({ "taskName": "   " })).unwrap_err();
/// assert_eq!(errors, vec!["Task name cannot be empty".to_string()]);
/// ```

pub mod account;
pub mod task;

/// Result of a validator: the cleaned value or every error message found
pub type Validated<T> = Result<T, Vec<String>>;

/// Finishes a validator run
fn finish<T>(errors: Vec<String>, value: impl FnOnce() -> T) -> Validated<T> {
    if errors.is_empty() {
        Ok(value())
    } else {
        Err(errors)
    }
}

/// Trims `input` and returns it with its length in characters
fn trimmed(input: &str) -> (&str, usize) {
    let trimmed = input.trim();
    (trimmed, trimmed.chars().count())
}
