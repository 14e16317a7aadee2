//! Handlers for the `/department` resource.

use axum::extract::State;
use pmdesk_core::error::CoreError;
use pmdesk_core::types::DbId;
use pmdesk_core::validation::validate_code;
use pmdesk_db::models::department::{CreateDepartment, Department, UpdateDepartment};
use pmdesk_db::repositories::DepartmentRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{ApiPath, ValidatedJson};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::{keyed, keyed_with_message, message, ApiJson, Empty, Keyed};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateDepartmentRequest {
    #[validate(length(min = 1, message = "Department ID is required"))]
    pub department_code: String,
    #[validate(length(min = 1, message = "Department name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_management: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateDepartmentRequest {
    #[validate(length(min = 1, message = "Department ID is required"))]
    pub department_code: Option<String>,
    #[validate(length(min = 1, message = "Department name is required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_management: Option<bool>,
}

async fn ensure_code_free(
    state: &AppState,
    code: &str,
    except: Option<DbId>,
) -> AppResult<()> {
    validate_code("Department ID", code)?;
    if let Some(existing) = DepartmentRepo::find_by_code(&state.pool, code).await? {
        if Some(existing.id) != except {
            return Err(CoreError::already_exists("Department").into());
        }
    }
    Ok(())
}

/// POST /api/department
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateDepartmentRequest>,
) -> AppResult<ApiJson<Keyed<Department>>> {
    ensure_code_free(&state, &input.department_code, None).await?;

    let department = DepartmentRepo::create(
        &state.pool,
        &CreateDepartment {
            department_code: input.department_code,
            name: input.name,
            description: input.description,
            is_management: input.is_management,
        },
    )
    .await?;

    tracing::info!(department_id = department.id, code = %department.department_code, "Department added");
    Ok(keyed_with_message("Department added", "department", department))
}

/// GET /api/department
pub async fn list(
    _auth: RequireAuth,
    State(state): State<AppState>,
) -> AppResult<ApiJson<Keyed<Vec<Department>>>> {
    let departments = DepartmentRepo::list(&state.pool).await?;
    Ok(keyed("departments", departments))
}

/// GET /api/department/{id}
pub async fn get_by_id(
    _auth: RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<ApiJson<Keyed<Department>>> {
    let department = DepartmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Department", id))?;
    Ok(keyed("department", department))
}

/// PUT /api/department/{id}
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateDepartmentRequest>,
) -> AppResult<ApiJson<Keyed<Department>>> {
    if let Some(code) = &input.department_code {
        ensure_code_free(&state, code, Some(id)).await?;
    }

    let department = DepartmentRepo::update(
        &state.pool,
        id,
        &UpdateDepartment {
            department_code: input.department_code,
            name: input.name,
            description: input.description,
            is_management: input.is_management,
        },
    )
    .await?
    .ok_or_else(|| CoreError::not_found("Department", id))?;

    tracing::info!(department_id = id, "Department updated");
    Ok(keyed_with_message("Department updated", "department", department))
}

/// DELETE /api/department/{id}
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<ApiJson<Empty>> {
    if !DepartmentRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Department", id).into());
    }
    tracing::info!(department_id = id, "Department deleted");
    Ok(message("Department deleted"))
}
