/// Database models for Taskwell
///
/// # Models
///
/// - `user`: User accounts
/// - `task`: Tasks and their owner-scoped CRUD operations
/// - `task_query`: Listing filters, sort order and statistics
///
/// # Example
///
/// ```no_run
/// use taskwell_shared::models::task::Task;
/// use taskwell_shared::models::task_query::{TaskFilter, TaskListQuery, TaskSort};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, owner_id: i32) -> Result<(), sqlx::Error> {
/// let query = TaskListQuery::new(TaskSort::Priority)
///     .with_filter(TaskFilter::Status(false));
///
/// let open_tasks = Task::list_for_owner(&pool, owner_id, &query).await?;
/// let stats = Task::stats_for_owner(&pool, owner_id).await?;
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod task_query;
pub mod user;
