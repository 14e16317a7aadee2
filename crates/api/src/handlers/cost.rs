//! Handlers for the `/cost` resource.
//!
//! Every write refreshes the owning project's `current_cost`; see
//! [`CostRepo`].

use axum::extract::State;
use pmdesk_core::error::CoreError;
use pmdesk_core::identity::ListScope;
use pmdesk_core::types::DbId;
use pmdesk_core::validation::validate_code;
use pmdesk_db::models::cost::{CostDetail, CreateCost, UpdateCost};
use pmdesk_db::repositories::{CostRepo, ProjectRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiPath, ApiQuery, ValidatedJson};
use crate::middleware::auth::Caller;
use crate::middleware::rbac::RequireStaff;
use crate::query::ListParams;
use crate::response::{keyed, keyed_with_message, message, ApiJson, Empty, Keyed};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateCostRequest {
    #[validate(length(min = 1, message = "Cost ID is required"))]
    pub cost_code: String,
    pub project_id: DbId,
    #[validate(length(min = 1, message = "Cost name is required"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "Amount cannot be negative"))]
    pub amount: f64,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateCostRequest {
    #[validate(length(min = 1, message = "Cost ID is required"))]
    pub cost_code: Option<String>,
    pub project_id: Option<DbId>,
    #[validate(length(min = 1, message = "Cost name is required"))]
    pub name: Option<String>,
    #[validate(range(min = 0.0, message = "Amount cannot be negative"))]
    pub amount: Option<f64>,
}

async fn ensure_code_free(state: &AppState, code: &str, except: Option<DbId>) -> AppResult<()> {
    validate_code("Cost ID", code)?;
    if let Some(existing) = CostRepo::find_by_code(&state.pool, code).await? {
        if Some(existing.id) != except {
            return Err(CoreError::already_exists("Cost").into());
        }
    }
    Ok(())
}

async fn ensure_project(state: &AppState, project_id: DbId) -> AppResult<()> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", project_id))?;
    Ok(())
}

async fn load_detail(state: &AppState, id: DbId) -> AppResult<CostDetail> {
    CostRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Cost", id).into())
}

/// POST /api/cost
pub async fn create(
    RequireStaff(identity): RequireStaff,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateCostRequest>,
) -> AppResult<ApiJson<Keyed<CostDetail>>> {
    ensure_code_free(&state, &input.cost_code, None).await?;
    ensure_project(&state, input.project_id).await?;

    let cost = CostRepo::create(
        &state.pool,
        &CreateCost {
            cost_code: input.cost_code,
            project_id: input.project_id,
            name: input.name,
            amount: input.amount,
            added_by: identity.user_id(),
        },
    )
    .await?;

    tracing::info!(cost_id = cost.id, project_id = cost.project_id, amount = cost.amount, "Cost added");
    Ok(keyed_with_message("Cost added", "cost", load_detail(&state, cost.id).await?))
}

/// GET /api/cost
pub async fn list(
    Caller(identity): Caller,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> AppResult<ApiJson<Keyed<Vec<CostDetail>>>> {
    let scope = identity.list_scope()?;
    let costs = CostRepo::list(&state.pool, scope, &params.into_criteria()?).await?;
    Ok(keyed("costs", costs))
}

/// GET /api/cost/{id}
pub async fn get_by_id(
    Caller(identity): Caller,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<ApiJson<Keyed<CostDetail>>> {
    let detail = load_detail(&state, id).await?;
    let cost = &detail.cost;
    let visible = match identity.list_scope()? {
        ListScope::All => true,
        ListScope::Managed(user_id) => {
            cost.added_by == Some(user_id)
                || ProjectRepo::is_supervisor(&state.pool, cost.project_id, user_id).await?
        }
        ListScope::Own(user_id) => cost.added_by == Some(user_id),
    };
    if !visible {
        return Err(AppError::forbidden("You cannot view this cost"));
    }
    Ok(keyed("cost", detail))
}

/// PUT /api/cost/{id}
pub async fn update(
    _staff: RequireStaff,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateCostRequest>,
) -> AppResult<ApiJson<Keyed<CostDetail>>> {
    if let Some(code) = &input.cost_code {
        ensure_code_free(&state, code, Some(id)).await?;
    }
    if let Some(project_id) = input.project_id {
        ensure_project(&state, project_id).await?;
    }

    let cost = CostRepo::update(
        &state.pool,
        id,
        &UpdateCost {
            cost_code: input.cost_code,
            project_id: input.project_id,
            name: input.name,
            amount: input.amount,
        },
    )
    .await?
    .ok_or_else(|| CoreError::not_found("Cost", id))?;

    tracing::info!(cost_id = id, project_id = cost.project_id, amount = cost.amount, "Cost updated");
    Ok(keyed_with_message("Cost updated", "cost", load_detail(&state, id).await?))
}

/// DELETE /api/cost/{id}
pub async fn delete(
    _staff: RequireStaff,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<ApiJson<Empty>> {
    let removed = CostRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Cost", id))?;
    tracing::info!(cost_id = id, project_id = removed.project_id, "Cost deleted");
    Ok(message("Cost deleted"))
}
