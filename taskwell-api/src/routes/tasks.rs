/// Task endpoints
///
/// Every handler receives the caller's [`Principal`] from the
/// authentication layer and scopes each query to it. A task owned by someone
/// else is reported exactly like a missing one.
///
/// # Endpoints
///
/// - `GET /tasks` - List tasks (`sortBy`, `category`, `completed`, `search`)
/// - `POST /tasks` - Create a task
/// - `GET /tasks/stats` - Aggregate counts
/// - `GET /tasks/:id` - Fetch one task
/// - `PUT /tasks/:id` - Partial update
/// - `DELETE /tasks/:id` - Delete a task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::JsonBody,
    response::ApiResponse,
};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Extension,
};
use serde::Serialize;
use serde_json::Value;
use taskwell_shared::{
    auth::gate::{validate_resource_id, Principal},
    models::{task::Task, task_query::TaskStats},
    validation::task::{
        validate_task_create, validate_task_query, validate_task_update, TaskListParams,
    },
};
use tracing::info;

/// Body of a successful delete
#[derive(Debug, Serialize)]
pub struct DeletedTask {
    pub id: i32,
}

/// List the caller's tasks
///
/// ```text
/// GET /tasks?sortBy=priority&completed=false&search=report
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Invalid query parameters
/// - `401 Unauthorized`: Not signed in
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    params: Result<Query<TaskListParams>, QueryRejection>,
) -> ApiResult<ApiResponse<Vec<Task>>> {
    let Query(params) = params?;
    let query = validate_task_query(&params).map_err(ApiError::invalid_query)?;

    let tasks = Task::list_for_owner(&state.db, principal.user_id, &query)
        .await
        .map_err(ApiError::operation("fetch tasks"))?;

    Ok(ApiResponse::ok(tasks))
}

/// Create a task
///
/// ```text
/// POST /tasks
/// Content-Type: application/json
///
/// {
///   "taskName": "Write report",
///   "description": "Quarterly numbers",
///   "dueDate": "2026-03-01T17:00:00Z",
///   "priority": "High",
///   "category": "work"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed JSON or validation failed
pub async fn create_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<ApiResponse<Task>> {
    let new_task = validate_task_create(&body).map_err(ApiError::validation)?;

    let task = Task::create(&state.db, principal.user_id, &new_task)
        .await
        .map_err(ApiError::operation("create task"))?;

    info!(task_id = task.id, user_id = principal.user_id, "Task created");
    Ok(ApiResponse::created(task).with_message("Task created successfully"))
}

/// Aggregate counts for the caller's tasks
pub async fn task_stats(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<ApiResponse<TaskStats>> {
    let stats = Task::stats_for_owner(&state.db, principal.user_id)
        .await
        .map_err(ApiError::operation("fetch task statistics"))?;

    Ok(ApiResponse::ok(stats))
}

/// Fetch one task
///
/// # Errors
///
/// - `400 Bad Request`: Id is not a positive number
/// - `404 Not Found`: No such task for this user
pub async fn get_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<Task>> {
    let task_id = validate_resource_id(&id)?;

    let task = Task::find_for_owner(&state.db, task_id, principal.user_id)
        .await
        .map_err(ApiError::operation("fetch task"))?
        .ok_or_else(ApiError::task_not_found)?;

    Ok(ApiResponse::ok(task))
}

/// Partially update a task
///
/// Omitted fields keep their value; `null` clears `description`,
/// `dueDate` and `category`.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid id, malformed JSON or validation failed
/// - `404 Not Found`: No such task for this user
pub async fn update_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<ApiResponse<Task>> {
    let task_id = validate_resource_id(&id)?;
    let update = validate_task_update(&body).map_err(ApiError::validation)?;

    let task = Task::update_for_owner(&state.db, task_id, principal.user_id, &update)
        .await
        .map_err(ApiError::operation("update task"))?
        .ok_or_else(ApiError::task_not_found)?;

    info!(task_id, user_id = principal.user_id, "Task updated");
    Ok(ApiResponse::ok(task).with_message("Task updated successfully"))
}

/// Delete a task
///
/// # Errors
///
/// - `400 Bad Request`: Id is not a positive number
/// - `404 Not Found`: No such task for this user
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<DeletedTask>> {
    let task_id = validate_resource_id(&id)?;

    let id = Task::delete_for_owner(&state.db, task_id, principal.user_id)
        .await
        .map_err(ApiError::operation("delete task"))?
        .ok_or_else(ApiError::task_not_found)?;

    info!(task_id = id, user_id = principal.user_id, "Task deleted");
    Ok(ApiResponse::ok(DeletedTask { id }).with_message("Task deleted successfully"))
}
