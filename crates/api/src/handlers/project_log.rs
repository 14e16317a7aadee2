//! Handlers for the `/project-log` resource (time tracking).

use axum::body::Bytes;
use axum::extract::State;
use chrono::Utc;
use pmdesk_core::error::CoreError;
use pmdesk_core::project::verify_project_password;
use pmdesk_core::types::{DbId, Timestamp};
use pmdesk_db::models::project_log::{CreateProjectLog, ProjectLogDetail};
use pmdesk_db::repositories::{ProjectLogRepo, ProjectRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiPath, ApiQuery, ValidatedJson};
use crate::middleware::auth::Caller;
use crate::middleware::rbac::{RequireAdmin, RequireMember};
use crate::query::ListParams;
use crate::response::{keyed, keyed_with_message, message, ApiJson, Empty, Keyed};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct StartLogRequest {
    pub project_id: DbId,
    #[validate(length(min = 1, message = "Project password is required"))]
    pub password: String,
    /// Defaults to the time the request is handled.
    pub start_time: Option<Timestamp>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StopLogRequest {
    pub end_time: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActiveParams {
    pub project_id: Option<DbId>,
}

async fn load_detail(state: &AppState, id: DbId) -> AppResult<ProjectLogDetail> {
    ProjectLogRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project log", id).into())
}

/// POST /api/project-log/start
///
/// Open a session on a project after checking its password.
pub async fn start(
    member: RequireMember,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<StartLogRequest>,
) -> AppResult<ApiJson<Keyed<ProjectLogDetail>>> {
    let project = ProjectRepo::find_by_id(&state.pool, input.project_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", input.project_id))?;

    if let Err(err) = verify_project_password(&project.password, &input.password) {
        tracing::info!(project_id = project.id, user_id = member.user_id, "Rejected time log start");
        return Err(err.into());
    }

    if ProjectLogRepo::find_open(&state.pool, member.user_id, Some(project.id))
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict(
            "A time log is already running for this project".into(),
        )
        .into());
    }

    let log = ProjectLogRepo::create(
        &state.pool,
        &CreateProjectLog {
            project_id: project.id,
            user_id: member.user_id,
            start_time: input.start_time.unwrap_or_else(Utc::now),
        },
    )
    .await?;

    tracing::info!(log_id = log.id, project_id = log.project_id, user_id = log.user_id, "Time log started");
    Ok(keyed_with_message("Time log started", "log", load_detail(&state, log.id).await?))
}

/// POST /api/project-log/{id}/stop
///
/// Close the caller's own session. The body is optional; without an
/// `end_time` the session ends now.
pub async fn stop(
    member: RequireMember,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    body: Bytes,
) -> AppResult<ApiJson<Keyed<ProjectLogDetail>>> {
    let input: StopLogRequest = if body.iter().all(u8::is_ascii_whitespace) {
        StopLogRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };

    let log = ProjectLogRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project log", id))?;

    if log.user_id != member.user_id {
        return Err(AppError::forbidden("Only the owner can stop this time log"));
    }
    log.state().ensure_open()?;

    let end_time = input.end_time.unwrap_or_else(Utc::now);
    let closed = ProjectLogRepo::close(&state.pool, &log, end_time)
        .await?
        .ok_or_else(|| CoreError::Conflict("Time log is already closed".into()))?;

    tracing::info!(log_id = id, total_time = ?closed.total_time, "Time log stopped");
    Ok(keyed_with_message("Time log stopped", "log", load_detail(&state, id).await?))
}

/// GET /api/project-log/active
///
/// The caller's open session, or `null`.
pub async fn active(
    member: RequireMember,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ActiveParams>,
) -> AppResult<ApiJson<Keyed<Option<ProjectLogDetail>>>> {
    let log = ProjectLogRepo::find_open(&state.pool, member.user_id, params.project_id).await?;
    Ok(keyed("log", log))
}

/// GET /api/project-log
pub async fn list(
    Caller(identity): Caller,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> AppResult<ApiJson<Keyed<Vec<ProjectLogDetail>>>> {
    let scope = identity.list_scope()?;
    let logs = ProjectLogRepo::list(&state.pool, scope, &params.into_criteria()?).await?;
    Ok(keyed("logs", logs))
}

/// DELETE /api/project-log/{id}
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<ApiJson<Empty>> {
    if !ProjectLogRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Project log", id).into());
    }
    tracing::info!(log_id = id, "Time log deleted");
    Ok(message("Time log deleted"))
}
