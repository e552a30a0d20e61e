/// Listing, filtering, sorting and statistics for tasks
///
/// Filters and the sort column arrive from the query string. The column
/// name never reaches SQL from user input: [`TaskSort`] maps each accepted
/// name to a fixed ORDER BY clause, and filter values are always bound.

use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use std::fmt;
use std::str::FromStr;

use super::task::task_columns;

/// Column a task list is ordered by
///
/// Every ordering ends with a deterministic tie-break on `created_at DESC,
/// id DESC`, so equal keys come back newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    /// High, then Medium, then Low
    Priority,

    /// Newest first
    #[default]
    CreatedAt,

    /// Latest due date first, tasks without a due date last
    DueDate,

    /// Reverse alphabetical
    TaskName,
}

/// Returned for a sort name outside the allowed set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported sort column '{0}'")]
pub struct TaskSortParseError(pub String);

impl TaskSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskSort::Priority => "priority",
            TaskSort::CreatedAt => "created_at",
            TaskSort::DueDate => "due_date",
            TaskSort::TaskName => "task_name",
        }
    }

    /// Parses a `sort` query parameter, falling back to [`TaskSort::CreatedAt`]
    /// for anything outside the allowed set
    pub fn from_param_or_default(param: Option<&str>) -> Self {
        param.and_then(|p| p.parse().ok()).unwrap_or_default()
    }

    fn order_clause(&self) -> &'static str {
        match self {
            TaskSort::Priority => {
                "CASE priority WHEN 'High' THEN 1 WHEN 'Medium' THEN 2 ELSE 3 END, \
                 created_at DESC, id DESC"
            }
            TaskSort::CreatedAt => "created_at DESC, id DESC",
            TaskSort::DueDate => "due_date DESC NULLS LAST, created_at DESC, id DESC",
            TaskSort::TaskName => "task_name DESC, created_at DESC, id DESC",
        }
    }
}

impl fmt::Display for TaskSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskSort {
    type Err = TaskSortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "priority" => Ok(TaskSort::Priority),
            "created_at" => Ok(TaskSort::CreatedAt),
            "due_date" => Ok(TaskSort::DueDate),
            "task_name" => Ok(TaskSort::TaskName),
            other => Err(TaskSortParseError(other.to_string())),
        }
    }
}

/// A single list filter; all filters in a query are ANDed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFilter {
    /// Exact category match
    Category(String),

    /// Completion state
    Status(bool),

    /// Case-insensitive substring of task name or description
    Search(String),
}

/// Sort and filters for a task listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    pub sort: TaskSort,
    pub filters: Vec<TaskFilter>,
}

impl TaskListQuery {
    pub fn new(sort: TaskSort) -> Self {
        Self {
            sort,
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: TaskFilter) -> Self {
        self.filters.push(filter);
        self
    }
}

/// Escapes LIKE metacharacters so user text matches literally
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Builds the owner-scoped SELECT for a listing
pub(crate) fn list_query(owner_id: i32, query: &TaskListQuery) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new(concat!(
        "SELECT ",
        task_columns!(),
        " FROM tasks WHERE user_id = "
    ));
    qb.push_bind(owner_id);

    for filter in &query.filters {
        match filter {
            TaskFilter::Category(category) => {
                qb.push(" AND category = ").push_bind(category.as_str());
            }
            TaskFilter::Status(completed) => {
                qb.push(" AND is_completed = ").push_bind(*completed);
            }
            TaskFilter::Search(text) => {
                let pattern = format!("%{}%", escape_like(text));
                qb.push(" AND (task_name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR description ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        }
    }

    qb.push(" ORDER BY ").push(query.sort.order_clause());
    qb
}

/// Raw aggregate row returned by the statistics query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::FromRow)]
pub struct TaskCounts {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub pending_tasks: i64,
    pub overdue_tasks: i64,
}

/// Summary statistics for one user's tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub pending_tasks: i64,
    pub overdue_tasks: i64,

    /// Completed share of all tasks as a whole percentage (0 when there are none)
    pub completion_rate: i64,
}

/// Percentage of `completed` in `total`, rounded half up
pub fn completion_rate(completed: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (completed * 200 + total) / (total * 2)
}

impl From<TaskCounts> for TaskStats {
    fn from(counts: TaskCounts) -> Self {
        Self {
            total_tasks: counts.total_tasks,
            completed_tasks: counts.completed_tasks,
            pending_tasks: counts.pending_tasks,
            overdue_tasks: counts.overdue_tasks,
            completion_rate: completion_rate(counts.completed_tasks, counts.total_tasks),
        }
    }
}
