/// Validation for task request bodies and list query parameters
///
/// Bodies arrive as raw JSON so that "field omitted" and "field is null"
/// stay distinguishable; that difference decides between
/// [`FieldUpdate::Unchanged`] and [`FieldUpdate::Clear`] on update.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::{finish, trimmed, Validated};
use crate::models::task::{FieldUpdate, NewTask, Priority, TaskUpdate};
use crate::models::task_query::{TaskFilter, TaskListQuery, TaskSort};

pub const TASK_NAME_MAX_LENGTH: usize = 255;
pub const CATEGORY_MAX_LENGTH: usize = 100;
pub const SEARCH_MAX_LENGTH: usize = 255;

const PRIORITY_MESSAGE: &str = "Priority must be one of: Low, Medium, High";
const CATEGORY_LENGTH_MESSAGE: &str = "Category must be 100 characters or less";

/// Naive formats accepted for due dates, interpreted as UTC
const NAIVE_DATE_TIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Raw query string parameters for `GET /tasks`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListParams {
    pub sort_by: Option<String>,
    pub category: Option<String>,
    pub completed: Option<String>,
    pub search: Option<String>,
}

/// Parses a due date
///
/// Accepts RFC 3339 (any offset, normalized to UTC), a naive date-time in
/// UTC with `T` or a space as separator, or a bare date meaning midnight UTC.
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

fn check_task_name(raw: &str, errors: &mut Vec<String>) -> Option<String> {
    let (name, len) = trimmed(raw);
    if len == 0 {
        errors.push("Task name cannot be empty".to_string());
        None
    } else if len > TASK_NAME_MAX_LENGTH {
        errors.push("Task name must be 255 characters or less".to_string());
        None
    } else {
        Some(name.to_string())
    }
}

/// Any present value, null included, must name a priority exactly
fn check_priority(value: &Value, errors: &mut Vec<String>) -> Option<Priority> {
    let parsed = value.as_str().and_then(|s| s.parse::<Priority>().ok());
    if parsed.is_none() {
        errors.push(PRIORITY_MESSAGE.to_string());
    }
    parsed
}

/// Trimmed text, or `None` when it trims to nothing
fn non_empty(raw: &str) -> Option<String> {
    let (text, len) = trimmed(raw);
    (len > 0).then(|| text.to_string())
}

/// Rules for a nullable text column on update
struct NullableText {
    type_message: &'static str,
    max: Option<(usize, &'static str)>,
}

impl NullableText {
    fn check(&self, value: Option<&Value>, errors: &mut Vec<String>) -> FieldUpdate<String> {
        match value {
            None => FieldUpdate::Unchanged,
            Some(Value::Null) => FieldUpdate::Clear,
            Some(Value::String(raw)) => {
                let (text, len) = trimmed(raw);
                match self.max {
                    Some((max, message)) if len > max => {
                        errors.push(message.to_string());
                        FieldUpdate::Unchanged
                    }
                    _ if len == 0 => FieldUpdate::Clear,
                    _ => FieldUpdate::Set(text.to_string()),
                }
            }
            Some(_) => {
                errors.push(self.type_message.to_string());
                FieldUpdate::Unchanged
            }
        }
    }
}

/// Validates a task creation body
///
/// Unknown fields are ignored; the owner is never taken from the body.
pub fn validate_task_create(input: &Value) -> Validated<NewTask> {
    let mut errors = Vec::new();

    let task_name = match input.get("taskName") {
        Some(Value::String(raw)) if !raw.is_empty() => check_task_name(raw, &mut errors),
        _ => {
            errors.push("Task name is required and must be a string".to_string());
            None
        }
    };

    let description = match input.get("description") {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => non_empty(raw),
        Some(_) => {
            errors.push("Description must be a string".to_string());
            None
        }
    };

    let due_date = match input.get("dueDate") {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => {
            let parsed = parse_due_date(raw);
            if parsed.is_none() {
                errors.push("Due date must be a valid date".to_string());
            }
            parsed
        }
        Some(_) => {
            errors.push("Due date must be a string or null".to_string());
            None
        }
    };

    let priority = input
        .get("priority")
        .and_then(|value| check_priority(value, &mut errors))
        .unwrap_or_default();

    let category = match input.get("category") {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => {
            let (text, len) = trimmed(raw);
            if len > CATEGORY_MAX_LENGTH {
                errors.push(CATEGORY_LENGTH_MESSAGE.to_string());
                None
            } else {
                (len > 0).then(|| text.to_string())
            }
        }
        Some(_) => {
            errors.push("Category must be a string".to_string());
            None
        }
    };

    match task_name {
        Some(task_name) if errors.is_empty() => Ok(NewTask {
            task_name,
            description,
            due_date,
            priority,
            category,
        }),
        _ => Err(errors),
    }
}

/// Validates a partial task update body
///
/// Every field is optional. `null` (and an empty string for description and
/// category) clears a nullable column.
pub fn validate_task_update(input: &Value) -> Validated<TaskUpdate> {
    let mut errors = Vec::new();

    let task_name = match input.get("taskName") {
        None => None,
        Some(Value::String(raw)) => check_task_name(raw, &mut errors),
        Some(_) => {
            errors.push("Task name must be a string".to_string());
            None
        }
    };

    let description = NullableText {
        type_message: "Description must be a string or null",
        max: None,
    }
    .check(input.get("description"), &mut errors);

    let is_completed = match input.get("isCompleted") {
        None => None,
        Some(Value::Bool(done)) => Some(*done),
        Some(_) => {
            errors.push("isCompleted must be a boolean".to_string());
            None
        }
    };

    let due_date = match input.get("dueDate") {
        None => FieldUpdate::Unchanged,
        Some(Value::Null) => FieldUpdate::Clear,
        Some(Value::String(raw)) => match parse_due_date(raw) {
            Some(date) => FieldUpdate::Set(date),
            None => {
                errors.push("Due date must be a valid date or null".to_string());
                FieldUpdate::Unchanged
            }
        },
        Some(_) => {
            errors.push("Due date must be a string or null".to_string());
            FieldUpdate::Unchanged
        }
    };

    let priority = input
        .get("priority")
        .and_then(|value| check_priority(value, &mut errors));

    let category = NullableText {
        type_message: "Category must be a string or null",
        max: Some((CATEGORY_MAX_LENGTH, CATEGORY_LENGTH_MESSAGE)),
    }
    .check(input.get("category"), &mut errors);

    finish(errors, || TaskUpdate {
        task_name,
        description,
        is_completed,
        due_date,
        priority,
        category,
    })
}

/// Validates list query parameters; empty values count as absent
pub fn validate_task_query(params: &TaskListParams) -> Validated<TaskListQuery> {
    fn present(param: &Option<String>) -> Option<&str> {
        param.as_deref().filter(|p| !p.is_empty())
    }

    let mut errors = Vec::new();
    let mut query = TaskListQuery::default();

    if let Some(sort_by) = present(&params.sort_by) {
        match sort_by.parse::<TaskSort>() {
            Ok(sort) => query.sort = sort,
            Err(_) => errors.push(
                "sortBy must be one of: created_at, due_date, priority, task_name".to_string(),
            ),
        }
    }

    if let Some(category) = present(&params.category) {
        let (text, len) = trimmed(category);
        if (1..=CATEGORY_MAX_LENGTH).contains(&len) {
            query.filters.push(TaskFilter::Category(text.to_string()));
        } else {
            errors.push("Category filter must be 1-100 characters".to_string());
        }
    }

    if let Some(completed) = present(&params.completed) {
        match completed {
            "true" => query.filters.push(TaskFilter::Status(true)),
            "false" => query.filters.push(TaskFilter::Status(false)),
            _ => errors.push("completed filter must be \"true\" or \"false\"".to_string()),
        }
    }

    if let Some(search) = present(&params.search) {
        let (text, len) = trimmed(search);
        if (1..=SEARCH_MAX_LENGTH).contains(&len) {
            query.filters.push(TaskFilter::Search(text.to_string()));
        } else {
            errors.push("Search query must be 1-255 characters".to_string());
        }
    }

    finish(errors, || query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn errors_of<T: std::fmt::Debug>(result: Validated<T>) -> Vec<String> {
        result.expect_err("validation should fail")
    }

    #[test]
    fn test_create_minimal_defaults_priority() {
        let task = validate_task_create(&json!({ "taskName": "  Buy milk  " })).unwrap();

        assert_eq!(task.task_name, "Buy milk");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.description, None);
        assert_eq!(task.due_date, None);
        assert_eq!(task.category, None);
    }

    #[test]
    fn test_create_full_body() {
        let task = validate_task_create(&json!({
            "taskName": "Write report",
            "description": "  quarterly numbers ",
            "dueDate": "2030-06-01T09:00:00Z",
            "priority": "High",
            "category": " Work ",
        }))
        .unwrap();

        assert_eq!(task.description.as_deref(), Some("quarterly numbers"));
        assert_eq!(
            task.due_date,
            Some(Utc.with_ymd_and_hms(2030, 6, 1, 9, 0, 0).unwrap())
        );
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.category.as_deref(), Some("Work"));
    }

    #[test]
    fn test_create_requires_task_name() {
        for body in [
            json!({}),
            json!({ "taskName": "" }),
            json!({ "taskName": null }),
            json!({ "taskName": 42 }),
        ] {
            assert_eq!(
                errors_of(validate_task_create(&body)),
                vec!["Task name is required and must be a string"]
            );
        }
    }

    #[test]
    fn test_create_rejects_blank_and_long_names() {
        assert_eq!(
            errors_of(validate_task_create(&json!({ "taskName": "   " }))),
            vec!["Task name cannot be empty"]
        );

        let long = "a".repeat(256);
        assert_eq!(
            errors_of(validate_task_create(&json!({ "taskName": long }))),
            vec!["Task name must be 255 characters or less"]
        );

        let exact = "é".repeat(255);
        assert!(validate_task_create(&json!({ "taskName": exact })).is_ok());
    }

    #[test]
    fn test_create_collects_every_error() {
        let errors = errors_of(validate_task_create(&json!({
            "taskName": "",
            "description": 7,
            "dueDate": "someday",
            "priority": "Urgent",
            "category": "c".repeat(101),
        })));

        assert_eq!(
            errors,
            vec![
                "Task name is required and must be a string",
                "Description must be a string",
                "Due date must be a valid date",
                "Priority must be one of: Low, Medium, High",
                "Category must be 100 characters or less",
            ]
        );
    }

    #[test]
    fn test_create_priority_null_is_rejected() {
        assert_eq!(
            errors_of(validate_task_create(&json!({ "taskName": "x", "priority": null }))),
            vec![PRIORITY_MESSAGE]
        );
        assert_eq!(
            errors_of(validate_task_create(&json!({ "taskName": "x", "priority": "low" }))),
            vec![PRIORITY_MESSAGE]
        );
    }

    #[test]
    fn test_create_due_date_wrong_type() {
        assert_eq!(
            errors_of(validate_task_create(&json!({ "taskName": "x", "dueDate": 1700000000 }))),
            vec!["Due date must be a string or null"]
        );
    }

    #[test]
    fn test_create_blank_optional_text_is_none() {
        let task = validate_task_create(&json!({
            "taskName": "x",
            "description": "   ",
            "category": "",
        }))
        .unwrap();

        assert_eq!(task.description, None);
        assert_eq!(task.category, None);
    }

    #[test]
    fn test_create_ignores_non_object_fields() {
        let task = validate_task_create(&json!({ "taskName": "x", "user_id": 999 })).unwrap();
        assert_eq!(task.task_name, "x");

        assert_eq!(
            errors_of(validate_task_create(&json!(["taskName"]))),
            vec!["Task name is required and must be a string"]
        );
    }

    #[test]
    fn test_update_empty_body_changes_nothing() {
        let update = validate_task_update(&json!({})).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_update_null_clears_and_omission_keeps() {
        let update = validate_task_update(&json!({
            "description": null,
            "dueDate": null,
            "category": "  ",
        }))
        .unwrap();

        assert_eq!(update.description, FieldUpdate::Clear);
        assert_eq!(update.due_date, FieldUpdate::Clear);
        assert_eq!(update.category, FieldUpdate::Clear);
        assert_eq!(update.task_name, None);

        let update = validate_task_update(&json!({ "isCompleted": true })).unwrap();
        assert_eq!(update.description, FieldUpdate::Unchanged);
        assert_eq!(update.is_completed, Some(true));
    }

    #[test]
    fn test_update_sets_values() {
        let update = validate_task_update(&json!({
            "taskName": " Renamed ",
            "description": "details",
            "dueDate": "2030-01-02",
            "priority": "Low",
            "category": "Home",
        }))
        .unwrap();

        assert_eq!(update.task_name.as_deref(), Some("Renamed"));
        assert_eq!(update.description, FieldUpdate::Set("details".to_string()));
        assert_eq!(
            update.due_date,
            FieldUpdate::Set(Utc.with_ymd_and_hms(2030, 1, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(update.priority, Some(Priority::Low));
        assert_eq!(update.category, FieldUpdate::Set("Home".to_string()));
    }

    #[test]
    fn test_update_type_errors() {
        let errors = errors_of(validate_task_update(&json!({
            "taskName": null,
            "description": 1,
            "isCompleted": "yes",
            "dueDate": false,
            "category": [],
        })));

        assert_eq!(
            errors,
            vec![
                "Task name must be a string",
                "Description must be a string or null",
                "isCompleted must be a boolean",
                "Due date must be a string or null",
                "Category must be a string or null",
            ]
        );
    }

    #[test]
    fn test_update_invalid_values() {
        let errors = errors_of(validate_task_update(&json!({
            "taskName": "",
            "dueDate": "31/12/2030",
            "priority": "Highest",
        })));

        assert_eq!(
            errors,
            vec![
                "Task name cannot be empty",
                "Due date must be a valid date or null",
                "Priority must be one of: Low, Medium, High",
            ]
        );
    }

    #[test]
    fn test_parse_due_date_formats() {
        let expected = Utc.with_ymd_and_hms(2030, 1, 15, 10, 30, 0).unwrap();

        assert_eq!(parse_due_date("2030-01-15T10:30:00Z"), Some(expected));
        assert_eq!(parse_due_date("2030-01-15T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_due_date("2030-01-15T10:30:00.000Z"), Some(expected));
        assert_eq!(parse_due_date("2030-01-15T10:30:00"), Some(expected));
        assert_eq!(parse_due_date("2030-01-15T10:30"), Some(expected));
        assert_eq!(parse_due_date("2030-01-15 10:30:00"), Some(expected));
        assert_eq!(
            parse_due_date("2030-01-15"),
            Some(Utc.with_ymd_and_hms(2030, 1, 15, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_due_date_rejects_garbage() {
        assert_eq!(parse_due_date(""), None);
        assert_eq!(parse_due_date("tomorrow"), None);
        assert_eq!(parse_due_date("2030-13-01"), None);
        assert_eq!(parse_due_date("2030-02-30"), None);
    }

    #[test]
    fn test_query_defaults() {
        let query = validate_task_query(&TaskListParams::default()).unwrap();
        assert_eq!(query.sort, TaskSort::CreatedAt);
        assert!(query.filters.is_empty());
    }

    #[test]
    fn test_query_empty_params_are_absent() {
        let params = TaskListParams {
            sort_by: Some(String::new()),
            category: Some(String::new()),
            completed: Some(String::new()),
            search: Some(String::new()),
        };
        let query = validate_task_query(&params).unwrap();
        assert_eq!(query, TaskListQuery::default());
    }

    #[test]
    fn test_query_builds_filters() {
        let params = TaskListParams {
            sort_by: Some("priority".to_string()),
            category: Some(" Work ".to_string()),
            completed: Some("true".to_string()),
            search: Some(" report ".to_string()),
        };
        let query = validate_task_query(&params).unwrap();

        assert_eq!(query.sort, TaskSort::Priority);
        assert_eq!(
            query.filters,
            vec![
                TaskFilter::Category("Work".to_string()),
                TaskFilter::Status(true),
                TaskFilter::Search("report".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_rejects_bad_params() {
        let params = TaskListParams {
            sort_by: Some("id".to_string()),
            category: Some("   ".to_string()),
            completed: Some("yes".to_string()),
            search: Some("s".repeat(256)),
        };

        assert_eq!(
            errors_of(validate_task_query(&params)),
            vec![
                "sortBy must be one of: created_at, due_date, priority, task_name",
                "Category filter must be 1-100 characters",
                "completed filter must be \"true\" or \"false\"",
                "Search query must be 1-255 characters",
            ]
        );
    }

    #[test]
    fn test_query_params_deserialize_camel_case() {
        let params: TaskListParams =
            serde_json::from_value(json!({ "sortBy": "due_date", "completed": "false" })).unwrap();
        assert_eq!(params.sort_by.as_deref(), Some("due_date"));
        assert_eq!(params.completed.as_deref(), Some("false"));
    }
}
