//! Repository for the `tasks` table.

use chrono::Utc;
use pmdesk_core::filter::ListCriteria;
use pmdesk_core::identity::ListScope;
use pmdesk_core::task::TaskStatus;
use pmdesk_core::types::DbId;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::task::{CreateTask, Task, TaskDetail, UpdateTask};
use crate::repositories::predicates::{
    push_criteria, push_supervises, DateColumn, FilterColumns,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, task_code, project_id, user_id, assigned_by, description, start_date, \
                       due_date, status, added, created_at, updated_at";

/// Joined select for [`TaskDetail`].
const DETAIL_SELECT: &str = "SELECT t.id, t.task_code, t.project_id, t.user_id, t.assigned_by, \
        t.description, t.start_date, t.due_date, t.status, t.added, t.created_at, t.updated_at, \
        p.project_code, p.name AS project_name, u.employee_id, u.name AS user_name, \
        a.name AS assigned_by_name \
     FROM tasks t \
     LEFT JOIN projects p ON p.id = t.project_id \
     LEFT JOIN users u ON u.id = t.user_id \
     LEFT JOIN users a ON a.id = t.assigned_by";

const FILTER_COLUMNS: FilterColumns = FilterColumns {
    project: "t.project_id",
    user: "t.user_id",
    employee: "u.employee_id",
    date: DateColumn::Date("t.start_date"),
};

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task in `pending` status, returning the created row.
    pub async fn create(pool: &SqlitePool, input: &CreateTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (task_code, project_id, user_id, assigned_by, description, \
                                start_date, due_date, status, added, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(&input.task_code)
            .bind(input.project_id)
            .bind(input.user_id)
            .bind(input.assigned_by)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.due_date)
            .bind(TaskStatus::Pending.as_str())
            .bind(input.added)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE task_code = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_detail(pool: &SqlitePool, id: DbId) -> Result<Option<TaskDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE t.id = $1");
        sqlx::query_as::<_, TaskDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Tasks visible in `scope` matching `criteria`, latest start first.
    pub async fn list(
        pool: &SqlitePool,
        scope: ListScope,
        criteria: &ListCriteria,
    ) -> Result<Vec<TaskDetail>, sqlx::Error> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(DETAIL_SELECT);
        qb.push(" WHERE 1 = 1");
        match scope {
            ListScope::All => {}
            ListScope::Managed(user_id) => {
                qb.push(" AND (t.assigned_by = ")
                    .push_bind(user_id)
                    .push(" OR t.user_id = ")
                    .push_bind(user_id)
                    .push(" OR ");
                push_supervises(&mut qb, "t.project_id", user_id);
                qb.push(")");
            }
            ListScope::Own(user_id) => {
                qb.push(" AND t.user_id = ").push_bind(user_id);
            }
        }
        push_criteria(&mut qb, criteria, FILTER_COLUMNS);
        qb.push(" ORDER BY t.start_date DESC, t.id DESC");
        qb.build_query_as::<TaskDetail>().fetch_all(pool).await
    }

    /// Update a task. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                task_code = COALESCE($2, task_code),
                project_id = COALESCE($3, project_id),
                user_id = COALESCE($4, user_id),
                description = COALESCE($5, description),
                start_date = COALESCE($6, start_date),
                due_date = COALESCE($7, due_date),
                status = COALESCE($8, status),
                updated_at = $9
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.task_code)
            .bind(input.project_id)
            .bind(input.user_id)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.due_date)
            .bind(input.status.map(|s| s.as_str()))
            .bind(Utc::now())
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a task. Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
