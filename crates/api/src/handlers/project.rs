//! Handlers for the `/projects` resource.

use axum::extract::State;
use pmdesk_core::error::CoreError;
use pmdesk_core::identity::{Identity, ListScope};
use pmdesk_core::project::{dedupe_members, DEFAULT_PROJECT_STATUS};
use pmdesk_core::types::DbId;
use pmdesk_core::validation::validate_code;
use pmdesk_db::models::project::{
    CreateProject, Members, ProjectDetail, ProjectSummary, UpdateProject,
};
use pmdesk_db::repositories::{ProjectRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiPath, ApiQuery, ValidatedJson};
use crate::middleware::auth::Caller;
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::response::{keyed, keyed_with_message, message, ApiJson, Empty, Keyed};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, message = "Project ID is required"))]
    pub project_code: String,
    #[validate(length(min = 1, message = "Project name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Project password is required"))]
    pub password: String,
    pub description: Option<String>,
    pub remark: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Estimated cost cannot be negative"))]
    pub estimated_cost: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Estimated hours cannot be negative"))]
    pub estimated_hours: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Current hours cannot be negative"))]
    pub current_hours: f64,
    pub status: Option<String>,
    #[serde(default)]
    pub managers: Vec<DbId>,
    #[serde(default)]
    pub team_leads: Vec<DbId>,
    #[serde(default)]
    pub resources: Vec<DbId>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, message = "Project ID is required"))]
    pub project_code: Option<String>,
    #[validate(length(min = 1, message = "Project name is required"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Project password is required"))]
    pub password: Option<String>,
    pub description: Option<String>,
    pub remark: Option<String>,
    #[validate(range(min = 0.0, message = "Estimated cost cannot be negative"))]
    pub estimated_cost: Option<f64>,
    #[validate(range(min = 0.0, message = "Estimated hours cannot be negative"))]
    pub estimated_hours: Option<f64>,
    #[validate(range(min = 0.0, message = "Current hours cannot be negative"))]
    pub current_hours: Option<f64>,
    #[validate(length(min = 1, message = "Status cannot be blank"))]
    pub status: Option<String>,
    pub managers: Option<Vec<DbId>>,
    pub team_leads: Option<Vec<DbId>>,
    pub resources: Option<Vec<DbId>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectListParams {
    /// Only projects where this user holds any assignment.
    pub user_id: Option<DbId>,
}

async fn ensure_code_free(state: &AppState, code: &str, except: Option<DbId>) -> AppResult<()> {
    validate_code("Project ID", code)?;
    if let Some(existing) = ProjectRepo::find_by_code(&state.pool, code).await? {
        if Some(existing.id) != except {
            return Err(CoreError::already_exists("Project").into());
        }
    }
    Ok(())
}

/// Every referenced user must exist.
async fn ensure_users_exist(state: &AppState, ids: &[DbId]) -> AppResult<()> {
    let missing = UserRepo::missing_ids(&state.pool, ids).await?;
    if let Some(id) = missing.first() {
        return Err(CoreError::not_found("User", id).into());
    }
    Ok(())
}

/// Reject callers whose list scope would not include the project.
pub(crate) async fn ensure_project_visible(
    state: &AppState,
    identity: &Identity,
    project_id: DbId,
) -> AppResult<()> {
    let visible = match identity.list_scope()? {
        ListScope::All => true,
        ListScope::Managed(user_id) => {
            ProjectRepo::is_supervisor(&state.pool, project_id, user_id).await?
        }
        ListScope::Own(user_id) => ProjectRepo::members(&state.pool, project_id)
            .await?
            .all_ids()
            .any(|id| id == user_id),
    };
    if !visible {
        return Err(AppError::forbidden("You are not assigned to this project"));
    }
    Ok(())
}

async fn load_detail(state: &AppState, id: DbId) -> AppResult<ProjectDetail> {
    ProjectRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", id).into())
}

/// POST /api/projects
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateProjectRequest>,
) -> AppResult<ApiJson<Keyed<ProjectDetail>>> {
    ensure_code_free(&state, &input.project_code, None).await?;

    let members = Members {
        managers: dedupe_members(&input.managers),
        team_leads: dedupe_members(&input.team_leads),
        resources: dedupe_members(&input.resources),
    };
    let ids: Vec<DbId> = members.all_ids().collect();
    ensure_users_exist(&state, &dedupe_members(&ids)).await?;

    let project = ProjectRepo::create(
        &state.pool,
        &CreateProject {
            project_code: input.project_code,
            name: input.name,
            password: input.password,
            description: input.description,
            remark: input.remark,
            estimated_cost: input.estimated_cost,
            estimated_hours: input.estimated_hours,
            current_hours: input.current_hours,
            status: input
                .status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PROJECT_STATUS.to_string()),
            members,
        },
    )
    .await?;

    tracing::info!(project_id = project.id, code = %project.project_code, "Project added");
    Ok(keyed_with_message(
        "Project added",
        "project",
        load_detail(&state, project.id).await?,
    ))
}

/// GET /api/projects
pub async fn list(
    Caller(identity): Caller,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ProjectListParams>,
) -> AppResult<ApiJson<Keyed<Vec<ProjectDetail>>>> {
    let scope = identity.list_scope()?;
    let projects = ProjectRepo::list(&state.pool, scope, params.user_id).await?;
    Ok(keyed("projects", projects))
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    Caller(identity): Caller,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<ApiJson<Keyed<ProjectDetail>>> {
    let project = load_detail(&state, id).await?;
    ensure_project_visible(&state, &identity, id).await?;
    Ok(keyed("project", project))
}

/// GET /api/projects/{id}/summary
pub async fn summary(
    RequireStaff(identity): RequireStaff,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<ApiJson<Keyed<ProjectSummary>>> {
    let summary = ProjectRepo::summary(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", id))?;
    ensure_project_visible(&state, &identity, id).await?;
    Ok(keyed("summary", summary))
}

/// PUT /api/projects/{id}
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateProjectRequest>,
) -> AppResult<ApiJson<Keyed<ProjectDetail>>> {
    if let Some(code) = &input.project_code {
        ensure_code_free(&state, code, Some(id)).await?;
    }

    let managers = input.managers.as_deref().map(dedupe_members);
    let team_leads = input.team_leads.as_deref().map(dedupe_members);
    let resources = input.resources.as_deref().map(dedupe_members);
    let referenced: Vec<DbId> = [&managers, &team_leads, &resources]
        .into_iter()
        .flatten()
        .flatten()
        .copied()
        .collect();
    ensure_users_exist(&state, &dedupe_members(&referenced)).await?;

    ProjectRepo::update(
        &state.pool,
        id,
        &UpdateProject {
            project_code: input.project_code,
            name: input.name,
            password: input.password,
            description: input.description,
            remark: input.remark,
            estimated_cost: input.estimated_cost,
            estimated_hours: input.estimated_hours,
            current_hours: input.current_hours,
            status: input.status,
            managers,
            team_leads,
            resources,
        },
    )
    .await?
    .ok_or_else(|| CoreError::not_found("Project", id))?;

    tracing::info!(project_id = id, "Project updated");
    Ok(keyed_with_message(
        "Project updated",
        "project",
        load_detail(&state, id).await?,
    ))
}

/// DELETE /api/projects/{id}
///
/// Tasks, costs, performances and logs of the project are kept.
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<ApiJson<Empty>> {
    if !ProjectRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Project", id).into());
    }
    tracing::info!(project_id = id, "Project deleted");
    Ok(message("Project deleted"))
}
