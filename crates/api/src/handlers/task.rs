//! Handlers for the `/tasks` resource.

use axum::extract::State;
use chrono::NaiveDate;
use pmdesk_core::error::CoreError;
use pmdesk_core::identity::{Identity, ListScope};
use pmdesk_core::task::{validate_schedule, TaskStatus};
use pmdesk_core::types::DbId;
use pmdesk_core::validation::validate_code;
use pmdesk_db::models::task::{CreateTask, Task, TaskDetail, UpdateTask};
use pmdesk_db::repositories::{ProjectRepo, TaskRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiPath, ApiQuery, ValidatedJson};
use crate::middleware::auth::Caller;
use crate::middleware::rbac::{RequireAuth, RequireStaff};
use crate::query::ListParams;
use crate::response::{keyed, keyed_with_message, message, ApiJson, Empty, Keyed};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, message = "Task ID is required"))]
    pub task_code: String,
    pub project_id: DbId,
    /// Assignee. Staff must name one; employees may only name themselves.
    pub user_id: Option<DbId>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, message = "Task ID is required"))]
    pub task_code: Option<String>,
    pub project_id: Option<DbId>,
    pub user_id: Option<DbId>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TaskStatusRequest {
    pub status: TaskStatus,
}

async fn ensure_code_free(state: &AppState, code: &str, except: Option<DbId>) -> AppResult<()> {
    validate_code("Task ID", code)?;
    if let Some(existing) = TaskRepo::find_by_code(&state.pool, code).await? {
        if Some(existing.id) != except {
            return Err(CoreError::already_exists("Task").into());
        }
    }
    Ok(())
}

async fn ensure_references(
    state: &AppState,
    project_id: Option<DbId>,
    user_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(id) = project_id {
        ProjectRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", id))?;
    }
    if let Some(id) = user_id {
        UserRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", id))?;
    }
    Ok(())
}

async fn load_task(state: &AppState, id: DbId) -> AppResult<Task> {
    TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Task", id).into())
}

/// Whether the task falls inside the caller's list scope.
async fn can_view(state: &AppState, identity: &Identity, task: &Task) -> AppResult<bool> {
    Ok(match identity.list_scope()? {
        ListScope::All => true,
        ListScope::Managed(user_id) => {
            task.assigned_by == Some(user_id)
                || task.user_id == user_id
                || ProjectRepo::is_supervisor(&state.pool, task.project_id, user_id).await?
        }
        ListScope::Own(user_id) => task.user_id == user_id,
    })
}

/// POST /api/tasks
///
/// Staff assign a task to `user_id`. Employees report their own work; the
/// task is assigned to them and marked as self-reported.
pub async fn create(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateTaskRequest>,
) -> AppResult<ApiJson<Keyed<TaskDetail>>> {
    let (user_id, assigned_by, added) = match identity {
        Identity::Employee { user_id } => {
            if input.user_id.is_some_and(|id| id != user_id) {
                return Err(AppError::forbidden("Employees can only add their own tasks"));
            }
            (user_id, None, false)
        }
        _ => {
            let user_id = input
                .user_id
                .ok_or_else(|| CoreError::Validation("Assignee is required".into()))?;
            (user_id, identity.user_id(), true)
        }
    };

    validate_schedule(input.start_date, input.due_date)?;
    ensure_code_free(&state, &input.task_code, None).await?;
    ensure_references(&state, Some(input.project_id), Some(user_id)).await?;

    let task = TaskRepo::create(
        &state.pool,
        &CreateTask {
            task_code: input.task_code,
            project_id: input.project_id,
            user_id,
            assigned_by,
            description: input.description,
            start_date: input.start_date,
            due_date: input.due_date,
            added,
        },
    )
    .await?;

    tracing::info!(task_id = task.id, project_id = task.project_id, user_id, added, "Task added");
    let detail = TaskRepo::find_detail(&state.pool, task.id)
        .await?
        .ok_or_else(|| CoreError::not_found("Task", task.id))?;
    Ok(keyed_with_message("Task added", "task", detail))
}

/// GET /api/tasks
pub async fn list(
    Caller(identity): Caller,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> AppResult<ApiJson<Keyed<Vec<TaskDetail>>>> {
    let scope = identity.list_scope()?;
    let tasks = TaskRepo::list(&state.pool, scope, &params.into_criteria()?).await?;
    Ok(keyed("tasks", tasks))
}

/// GET /api/tasks/{id}
pub async fn get_by_id(
    Caller(identity): Caller,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<ApiJson<Keyed<TaskDetail>>> {
    let task = load_task(&state, id).await?;
    if !can_view(&state, &identity, &task).await? {
        return Err(AppError::forbidden("You cannot view this task"));
    }
    let detail = TaskRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Task", id))?;
    Ok(keyed("task", detail))
}

/// PUT /api/tasks/{id}
pub async fn update(
    _staff: RequireStaff,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateTaskRequest>,
) -> AppResult<ApiJson<Keyed<TaskDetail>>> {
    let current = load_task(&state, id).await?;

    validate_schedule(
        input.start_date.unwrap_or(current.start_date),
        input.due_date.unwrap_or(current.due_date),
    )?;
    if let Some(next) = input.status {
        current.status.ensure_transition(next)?;
    }
    if let Some(code) = &input.task_code {
        ensure_code_free(&state, code, Some(id)).await?;
    }
    ensure_references(&state, input.project_id, input.user_id).await?;

    TaskRepo::update(
        &state.pool,
        id,
        &UpdateTask {
            task_code: input.task_code,
            project_id: input.project_id,
            user_id: input.user_id,
            description: input.description,
            start_date: input.start_date,
            due_date: input.due_date,
            status: input.status,
        },
    )
    .await?
    .ok_or_else(|| CoreError::not_found("Task", id))?;

    tracing::info!(task_id = id, "Task updated");
    let detail = TaskRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Task", id))?;
    Ok(keyed_with_message("Task updated", "task", detail))
}

/// PUT /api/tasks/{id}/status
///
/// The assignee or staff may complete or reject a pending task.
pub async fn set_status(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ValidatedJson(input): ValidatedJson<TaskStatusRequest>,
) -> AppResult<ApiJson<Keyed<TaskDetail>>> {
    let current = load_task(&state, id).await?;
    if !identity.can_act_for(current.user_id) {
        return Err(AppError::forbidden("Only the assignee or staff can change the status"));
    }
    current.status.ensure_transition(input.status)?;

    TaskRepo::update(
        &state.pool,
        id,
        &UpdateTask {
            status: Some(input.status),
            ..UpdateTask::default()
        },
    )
    .await?
    .ok_or_else(|| CoreError::not_found("Task", id))?;

    tracing::info!(task_id = id, status = %input.status, by = identity.label(), "Task status changed");
    let detail = TaskRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Task", id))?;
    Ok(keyed_with_message("Task status updated", "task", detail))
}

/// DELETE /api/tasks/{id}
pub async fn delete(
    _staff: RequireStaff,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<ApiJson<Empty>> {
    if !TaskRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Task", id).into());
    }
    tracing::info!(task_id = id, "Task deleted");
    Ok(message("Task deleted"))
}
