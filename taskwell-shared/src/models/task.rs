/// Task model and owner-scoped database operations
///
/// Every statement in this module carries `user_id = $owner` in its own
/// predicate. A task owned by someone else is indistinguishable from a task
/// that doesn't exist: lookups return `None` and mutations affect zero rows.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id SERIAL PRIMARY KEY,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     task_name VARCHAR(255) NOT NULL,
///     description TEXT,
///     is_completed BOOLEAN NOT NULL DEFAULT FALSE,
///     due_date TIMESTAMPTZ,
///     priority VARCHAR(10) NOT NULL DEFAULT 'Medium'
///         CHECK (priority IN ('Low', 'Medium', 'High')),
///     category VARCHAR(100),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskwell_shared::models::task::{NewTask, Priority, Task};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, owner_id: i32) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, owner_id, &NewTask {
///     task_name: "Water the plants".to_string(),
///     description: None,
///     due_date: None,
///     priority: Priority::High,
///     category: Some("Home".to_string()),
/// }).await?;
///
/// assert_eq!(task.user_id, owner_id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::task_query::{list_query, TaskCounts, TaskListQuery, TaskStats};

macro_rules! task_columns {
    () => {
        "id, user_id, task_name, description, is_completed, due_date, priority, category, created_at"
    };
}
pub(crate) use task_columns;

/// Task priority
///
/// Stored as its exact name (`Low`, `Medium`, `High`) and guarded by a CHECK
/// constraint in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Returned when a string is not one of the three priority names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority '{0}', expected one of: Low, Medium, High")]
pub struct PriorityParseError(pub String);

impl Priority {
    /// All priorities, most severe first
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Sort rank used when ordering by priority (High = 1)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = PriorityParseError;

    /// Exact, case-sensitive match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Priority::Low),
            "Medium" => Ok(Priority::Medium),
            "High" => Ok(Priority::High),
            other => Err(PriorityParseError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = PriorityParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A task row
///
/// Serializes with the column names, which is the JSON shape clients see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i32,

    /// Owning user
    pub user_id: i32,

    pub task_name: String,

    pub description: Option<String>,

    pub is_completed: bool,

    pub due_date: Option<DateTime<Utc>>,

    #[sqlx(try_from = "String")]
    pub priority: Priority,

    pub category: Option<String>,

    /// Assigned by the database at insert
    pub created_at: DateTime<Utc>,
}

/// Validated fields for a new task
///
/// Produced by `validation::task::validate_task_create`; the owner comes
/// from the authenticated principal, never from the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub task_name: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub category: Option<String>,
}

/// Change to a single nullable column
///
/// Keeps "leave it alone" and "set it to NULL" apart, which a plain
/// `Option<T>` cannot do.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    /// Field was omitted; stored value is kept
    #[default]
    Unchanged,

    /// Field is replaced with a new value
    Set(T),

    /// Field is cleared to NULL
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, FieldUpdate::Unchanged)
    }

    /// Applies the update to a current value
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            FieldUpdate::Unchanged => current,
            FieldUpdate::Set(value) => Some(value),
            FieldUpdate::Clear => None,
        }
    }
}

/// Validated partial update
///
/// Non-nullable columns use `Option` (None = unchanged); nullable columns
/// use [`FieldUpdate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub task_name: Option<String>,
    pub description: FieldUpdate<String>,
    pub is_completed: Option<bool>,
    pub due_date: FieldUpdate<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub category: FieldUpdate<String>,
}

impl TaskUpdate {
    /// True when the update would not change any column
    pub fn is_empty(&self) -> bool {
        self.task_name.is_none()
            && self.description.is_unchanged()
            && self.is_completed.is_none()
            && self.due_date.is_unchanged()
            && self.priority.is_none()
            && self.category.is_unchanged()
    }
}

/// Pushes `column = $n` for a set value or `column = NULL` for a clear
fn push_nullable<'a, T>(
    set: &mut sqlx::query_builder::Separated<'_, 'a, Postgres, &'static str>,
    column: &str,
    update: &'a FieldUpdate<T>,
) where
    T: sqlx::Encode<'a, Postgres> + sqlx::Type<Postgres> + Send + Sync + Clone + 'a,
{
    match update {
        FieldUpdate::Unchanged => {}
        FieldUpdate::Set(value) => {
            set.push(format!("{column} = "));
            set.push_bind_unseparated(value.clone());
        }
        FieldUpdate::Clear => {
            set.push(format!("{column} = NULL"));
        }
    }
}

/// Builds the owner-scoped UPDATE for the fields present in `update`
///
/// Returns `None` when there is nothing to change.
pub(crate) fn update_query(
    task_id: i32,
    owner_id: i32,
    update: &TaskUpdate,
) -> Option<QueryBuilder<'_, Postgres>> {
    if update.is_empty() {
        return None;
    }

    let mut qb = QueryBuilder::new("UPDATE tasks SET ");
    {
        let mut set = qb.separated(", ");

        if let Some(name) = &update.task_name {
            set.push("task_name = ");
            set.push_bind_unseparated(name.as_str());
        }
        push_nullable(&mut set, "description", &update.description);
        if let Some(done) = update.is_completed {
            set.push("is_completed = ");
            set.push_bind_unseparated(done);
        }
        push_nullable(&mut set, "due_date", &update.due_date);
        if let Some(priority) = update.priority {
            set.push("priority = ");
            set.push_bind_unseparated(priority.as_str());
        }
        push_nullable(&mut set, "category", &update.category);
    }

    qb.push(" WHERE id = ")
        .push_bind(task_id)
        .push(" AND user_id = ")
        .push_bind(owner_id)
        .push(concat!(" RETURNING ", task_columns!()));

    Some(qb)
}

impl Task {
    /// Inserts a task owned by `owner_id`
    ///
    /// Returns the stored row including the generated id and timestamp.
    pub async fn create(pool: &PgPool, owner_id: i32, data: &NewTask) -> Result<Self, sqlx::Error> {
        debug!(owner_id, priority = %data.priority, "Inserting task");

        sqlx::query_as::<_, Task>(concat!(
            "INSERT INTO tasks (user_id, task_name, description, due_date, priority, category) ",
            "VALUES ($1, $2, $3, $4, $5, $6) ",
            "RETURNING ",
            task_columns!()
        ))
        .bind(owner_id)
        .bind(&data.task_name)
        .bind(&data.description)
        .bind(data.due_date)
        .bind(data.priority.as_str())
        .bind(&data.category)
        .fetch_one(pool)
        .await
    }

    /// Fetches a single task if it exists and belongs to `owner_id`
    pub async fn find_for_owner(
        pool: &PgPool,
        task_id: i32,
        owner_id: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(concat!(
            "SELECT ",
            task_columns!(),
            " FROM tasks WHERE id = $1 AND user_id = $2 LIMIT 1"
        ))
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists the owner's tasks matching every filter in `query`, sorted
    ///
    /// No match is an empty vector, not an error.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: i32,
        query: &TaskListQuery,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut qb = list_query(owner_id, query);
        debug!(
            owner_id,
            sort = %query.sort,
            filters = query.filters.len(),
            "Listing tasks"
        );

        qb.build_query_as::<Task>().fetch_all(pool).await
    }

    /// Applies a partial update to a task owned by `owner_id`
    ///
    /// Returns `None` when no row matches both id and owner. An update that
    /// changes nothing returns the current row.
    pub async fn update_for_owner(
        pool: &PgPool,
        task_id: i32,
        owner_id: i32,
        update: &TaskUpdate,
    ) -> Result<Option<Self>, sqlx::Error> {
        match update_query(task_id, owner_id, update) {
            Some(mut qb) => {
                debug!(task_id, owner_id, "Updating task");
                qb.build_query_as::<Task>().fetch_optional(pool).await
            }
            None => Self::find_for_owner(pool, task_id, owner_id).await,
        }
    }

    /// Deletes a task owned by `owner_id`, returning its id
    pub async fn delete_for_owner(
        pool: &PgPool,
        task_id: i32,
        owner_id: i32,
    ) -> Result<Option<i32>, sqlx::Error> {
        let deleted: Option<(i32,)> =
            sqlx::query_as("DELETE FROM tasks WHERE id = $1 AND user_id = $2 RETURNING id")
                .bind(task_id)
                .bind(owner_id)
                .fetch_optional(pool)
                .await?;

        Ok(deleted.map(|(id,)| id))
    }

    /// Aggregate counts for the owner's tasks in a single pass
    pub async fn stats_for_owner(pool: &PgPool, owner_id: i32) -> Result<TaskStats, sqlx::Error> {
        let counts = sqlx::query_as::<_, TaskCounts>(
            r#"
            SELECT
                COUNT(*) AS total_tasks,
                COUNT(*) FILTER (WHERE is_completed) AS completed_tasks,
                COUNT(*) FILTER (WHERE NOT is_completed) AS pending_tasks,
                COUNT(*) FILTER (WHERE due_date < NOW() AND NOT is_completed) AS overdue_tasks
            FROM tasks
            WHERE user_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Ok(TaskStats::from(counts))
    }
}
