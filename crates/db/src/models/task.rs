//! Task entity model and DTOs.

use chrono::NaiveDate;
use pmdesk_core::task::TaskStatus;
use pmdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub task_code: String,
    pub project_id: DbId,
    pub user_id: DbId,
    pub assigned_by: Option<DbId>,
    pub description: String,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    /// `true` when entered by staff, `false` when self-reported.
    pub added: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Task with project and people fields joined in. Referenced rows that no
/// longer exist come back as `None`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub task: Task,
    pub project_code: Option<String>,
    pub project_name: Option<String>,
    pub employee_id: Option<String>,
    pub user_name: Option<String>,
    pub assigned_by_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateTask {
    pub task_code: String,
    pub project_id: DbId,
    pub user_id: DbId,
    pub assigned_by: Option<DbId>,
    pub description: String,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub added: bool,
}

/// Partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub task_code: Option<String>,
    pub project_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
}
