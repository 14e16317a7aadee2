//! Handlers for the `/performances` resource (drawing output records).

use axum::extract::State;
use chrono::NaiveDate;
use pmdesk_core::error::CoreError;
use pmdesk_core::filter::DateRange;
use pmdesk_core::identity::{Identity, ListScope};
use pmdesk_core::performance::ReviewStatus;
use pmdesk_core::project::dedupe_members;
use pmdesk_core::types::DbId;
use pmdesk_core::validation::validate_code;
use pmdesk_db::models::performance::{
    CreatePerformance, DrawingTotal, Performance, PerformanceDetail, UpdatePerformance,
};
use pmdesk_db::repositories::{PerformanceRepo, ProjectRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiPath, ApiQuery, ValidatedJson};
use crate::middleware::auth::Caller;
use crate::middleware::rbac::{RequireAuth, RequireStaff};
use crate::query::{ListParams, MonthParams};
use crate::response::{keyed, keyed_with_message, message, with_payload, ApiJson, Empty, Keyed};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreatePerformanceRequest {
    #[validate(length(min = 1, message = "Performance ID is required"))]
    pub performance_code: String,
    pub project_id: DbId,
    /// Author. Staff must name one; employees record their own output.
    pub user_id: Option<DbId>,
    #[validate(length(min = 1, message = "Drawing type is required"))]
    pub drawing_type: String,
    #[validate(range(min = 0, message = "Drawings cannot be negative"))]
    pub drawings: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub drawing_released: Vec<DbId>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdatePerformanceRequest {
    #[validate(length(min = 1, message = "Performance ID is required"))]
    pub performance_code: Option<String>,
    pub project_id: Option<DbId>,
    #[validate(length(min = 1, message = "Drawing type is required"))]
    pub drawing_type: Option<String>,
    #[validate(range(min = 0, message = "Drawings cannot be negative"))]
    pub drawings: Option<i64>,
    pub date: Option<NaiveDate>,
    pub status: Option<ReviewStatus>,
    pub drawing_released: Option<Vec<DbId>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ReviewRequest {
    pub status: ReviewStatus,
}

#[derive(Debug, Serialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub totals: Vec<DrawingTotal>,
}

async fn ensure_code_free(state: &AppState, code: &str, except: Option<DbId>) -> AppResult<()> {
    validate_code("Performance ID", code)?;
    if let Some(existing) = PerformanceRepo::find_by_code(&state.pool, code).await? {
        if Some(existing.id) != except {
            return Err(CoreError::already_exists("Performance").into());
        }
    }
    Ok(())
}

async fn ensure_references(
    state: &AppState,
    project_id: Option<DbId>,
    user_ids: &[DbId],
) -> AppResult<()> {
    if let Some(id) = project_id {
        ProjectRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", id))?;
    }
    let missing = UserRepo::missing_ids(&state.pool, user_ids).await?;
    if let Some(id) = missing.first() {
        return Err(CoreError::not_found("User", id).into());
    }
    Ok(())
}

async fn load(state: &AppState, id: DbId) -> AppResult<Performance> {
    PerformanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Performance", id).into())
}

async fn load_detail(state: &AppState, id: DbId) -> AppResult<PerformanceDetail> {
    PerformanceRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Performance", id).into())
}

async fn is_releaser(state: &AppState, id: DbId, user_id: DbId) -> AppResult<bool> {
    Ok(PerformanceRepo::released_to(&state.pool, id)
        .await?
        .contains(&user_id))
}

/// POST /api/performances
pub async fn create(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreatePerformanceRequest>,
) -> AppResult<ApiJson<Keyed<PerformanceDetail>>> {
    let user_id = match identity {
        Identity::Employee { user_id } => {
            if input.user_id.is_some_and(|id| id != user_id) {
                return Err(AppError::forbidden(
                    "Employees can only record their own performance",
                ));
            }
            user_id
        }
        _ => input
            .user_id
            .ok_or_else(|| CoreError::Validation("Author is required".into()))?,
    };

    let released = dedupe_members(&input.drawing_released);
    let mut referenced = released.clone();
    referenced.push(user_id);

    ensure_code_free(&state, &input.performance_code, None).await?;
    ensure_references(&state, Some(input.project_id), &dedupe_members(&referenced)).await?;

    let performance = PerformanceRepo::create(
        &state.pool,
        &CreatePerformance {
            performance_code: input.performance_code,
            project_id: input.project_id,
            user_id,
            drawing_type: input.drawing_type,
            drawings: input.drawings,
            date: input.date,
            drawing_released: released,
        },
    )
    .await?;

    tracing::info!(
        performance_id = performance.id,
        project_id = performance.project_id,
        user_id,
        drawings = performance.drawings,
        "Performance added"
    );
    Ok(keyed_with_message(
        "Performance added",
        "performance",
        load_detail(&state, performance.id).await?,
    ))
}

/// GET /api/performances
pub async fn list(
    Caller(identity): Caller,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> AppResult<ApiJson<Keyed<Vec<PerformanceDetail>>>> {
    let scope = identity.list_scope()?;
    let records = PerformanceRepo::list(&state.pool, scope, &params.into_criteria()?).await?;
    Ok(keyed("performances", records))
}

/// GET /api/performances/report
///
/// Drawing totals per author for one month, within the caller's scope.
pub async fn report(
    Caller(identity): Caller,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<MonthParams>,
) -> AppResult<ApiJson<MonthlyReport>> {
    let scope = identity.list_scope()?;
    let range = DateRange::month(params.year, params.month)?;
    let totals = PerformanceRepo::totals(&state.pool, scope, range, params.project_id).await?;
    Ok(with_payload(MonthlyReport {
        year: params.year,
        month: params.month,
        totals,
    }))
}

/// GET /api/performances/{id}
pub async fn get_by_id(
    Caller(identity): Caller,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<ApiJson<Keyed<PerformanceDetail>>> {
    let detail = load_detail(&state, id).await?;
    let record = &detail.performance;
    let visible = match identity.list_scope()? {
        ListScope::All => true,
        ListScope::Managed(user_id) => {
            record.user_id == user_id
                || detail.drawing_released.iter().any(|u| u.id == user_id)
                || ProjectRepo::is_supervisor(&state.pool, record.project_id, user_id).await?
        }
        ListScope::Own(user_id) => {
            record.user_id == user_id || detail.drawing_released.iter().any(|u| u.id == user_id)
        }
    };
    if !visible {
        return Err(AppError::forbidden("You cannot view this record"));
    }
    Ok(keyed("performance", detail))
}

/// PUT /api/performances/{id}
///
/// Staff may change anything. The author may edit a pending record but not
/// review it.
pub async fn update(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ValidatedJson(input): ValidatedJson<UpdatePerformanceRequest>,
) -> AppResult<ApiJson<Keyed<PerformanceDetail>>> {
    let current = load(&state, id).await?;

    if !identity.is_staff() {
        if identity.user_id() != Some(current.user_id) {
            return Err(AppError::forbidden("Only the author or staff can edit this record"));
        }
        if current.status != ReviewStatus::Pending {
            return Err(AppError::forbidden("Reviewed records can only be edited by staff"));
        }
        if input.status.is_some() {
            return Err(AppError::forbidden("Authors cannot review their own records"));
        }
    }
    if let Some(next) = input.status {
        current.status.ensure_transition(next)?;
    }
    if let Some(code) = &input.performance_code {
        ensure_code_free(&state, code, Some(id)).await?;
    }
    let released = input.drawing_released.as_deref().map(dedupe_members);
    ensure_references(
        &state,
        input.project_id,
        released.as_deref().unwrap_or_default(),
    )
    .await?;

    PerformanceRepo::update(
        &state.pool,
        id,
        &UpdatePerformance {
            performance_code: input.performance_code,
            project_id: input.project_id,
            drawing_type: input.drawing_type,
            drawings: input.drawings,
            date: input.date,
            status: input.status,
            drawing_released: released,
        },
    )
    .await?
    .ok_or_else(|| CoreError::not_found("Performance", id))?;

    tracing::info!(performance_id = id, by = identity.label(), "Performance updated");
    Ok(keyed_with_message(
        "Performance updated",
        "performance",
        load_detail(&state, id).await?,
    ))
}

/// PUT /api/performances/{id}/status
///
/// Staff, or a user the drawings were released to, approve or reject.
pub async fn review(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ValidatedJson(input): ValidatedJson<ReviewRequest>,
) -> AppResult<ApiJson<Keyed<PerformanceDetail>>> {
    let current = load(&state, id).await?;

    let allowed = match identity.user_id() {
        _ if identity.is_staff() => true,
        Some(user_id) => is_releaser(&state, id, user_id).await?,
        None => false,
    };
    if !allowed {
        return Err(AppError::forbidden("Only staff or a listed reviewer can review"));
    }
    current.status.ensure_transition(input.status)?;

    PerformanceRepo::update(
        &state.pool,
        id,
        &UpdatePerformance {
            status: Some(input.status),
            ..UpdatePerformance::default()
        },
    )
    .await?
    .ok_or_else(|| CoreError::not_found("Performance", id))?;

    tracing::info!(performance_id = id, status = %input.status, by = identity.label(), "Performance reviewed");
    Ok(keyed_with_message(
        "Performance status updated",
        "performance",
        load_detail(&state, id).await?,
    ))
}

/// DELETE /api/performances/{id}
pub async fn delete(
    _staff: RequireStaff,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<ApiJson<Empty>> {
    if !PerformanceRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Performance", id).into());
    }
    tracing::info!(performance_id = id, "Performance deleted");
    Ok(message("Performance deleted"))
}
