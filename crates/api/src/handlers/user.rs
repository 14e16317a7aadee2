//! Handlers for the `/user` resource: registration, profiles and admin
//! account management.

use axum::extract::State;
use pmdesk_core::error::CoreError;
use pmdesk_core::roles::Role;
use pmdesk_core::types::DbId;
use pmdesk_core::validation::validate_code;
use pmdesk_db::models::user::{CreateUser, UpdateUser, UserDetail};
use pmdesk_db::repositories::{DepartmentRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_user_token;
use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiPath, ApiQuery, ValidatedJson};
use crate::middleware::rbac::{RequireAdmin, RequireMember, RequireStaff};
use crate::response::{keyed, keyed_with_message, message, with_payload, ApiJson, Empty, Keyed};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Employee ID is required"))]
    pub employee_id: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email."))]
    pub email: String,
    #[validate(length(min = 8, message = "Please enter a strong password."))]
    pub password: String,
    pub phone: Option<String>,
    pub department_id: Option<DbId>,
    pub branch: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Admin edit of any account. Absent fields keep their value.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "Employee ID is required"))]
    pub employee_id: Option<String>,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(email(message = "Please enter a valid email."))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Please enter a strong password."))]
    pub password: Option<String>,
    pub phone: Option<String>,
    pub department_id: Option<DbId>,
    pub branch: Option<String>,
    pub role: Option<Role>,
}

/// Fields a user may change on their own profile.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    pub phone: Option<String>,
    pub branch: Option<String>,
    #[validate(length(min = 8, message = "Please enter a strong password."))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserListParams {
    pub department_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct Registered {
    pub user: UserDetail,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

/// Natural keys must stay unique; `except` is the user being edited.
async fn ensure_unique(
    state: &AppState,
    employee_id: Option<&str>,
    email: Option<&str>,
    except: Option<DbId>,
) -> AppResult<()> {
    if let Some(employee_id) = employee_id {
        validate_code("Employee ID", employee_id)?;
        if let Some(existing) = UserRepo::find_by_employee_id(&state.pool, employee_id).await? {
            if Some(existing.id) != except {
                return Err(CoreError::already_exists("User").into());
            }
        }
    }
    if let Some(email) = email {
        if let Some(existing) = UserRepo::find_by_email(&state.pool, email).await? {
            if Some(existing.id) != except {
                return Err(CoreError::Conflict("Email is already registered".into()).into());
            }
        }
    }
    Ok(())
}

async fn ensure_department(state: &AppState, department_id: Option<DbId>) -> AppResult<()> {
    if let Some(id) = department_id {
        DepartmentRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Department", id))?;
    }
    Ok(())
}

async fn load_detail(state: &AppState, id: DbId) -> AppResult<UserDetail> {
    Ok(UserRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id))?)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/user/register
///
/// Admin creates an account. The response carries a token for the new user.
pub async fn register(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> AppResult<ApiJson<Registered>> {
    ensure_unique(&state, Some(&input.employee_id), Some(&input.email), None).await?;
    ensure_department(&state, input.department_id).await?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            employee_id: input.employee_id,
            name: input.name,
            email: input.email,
            password_hash: hash(&input.password)?,
            phone: input.phone,
            department_id: input.department_id,
            branch: input.branch,
            role: input.role,
        },
    )
    .await?;

    let token = generate_user_token(user.id, user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, role = %user.role, "User registered");
    Ok(with_payload(Registered {
        user: load_detail(&state, user.id).await?,
        token,
    }))
}

/// GET /api/user
pub async fn list(
    _staff: RequireStaff,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserListParams>,
) -> AppResult<ApiJson<Keyed<Vec<UserDetail>>>> {
    let users = UserRepo::list(&state.pool, params.department_id).await?;
    Ok(keyed("users", users))
}

/// GET /api/user/me
pub async fn me(
    member: RequireMember,
    State(state): State<AppState>,
) -> AppResult<ApiJson<Keyed<UserDetail>>> {
    Ok(keyed("user", load_detail(&state, member.user_id).await?))
}

/// PUT /api/user/me
pub async fn update_me(
    member: RequireMember,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<ApiJson<Keyed<UserDetail>>> {
    let password_hash = input.password.as_deref().map(hash).transpose()?;

    UserRepo::update(
        &state.pool,
        member.user_id,
        &UpdateUser {
            name: input.name,
            phone: input.phone,
            branch: input.branch,
            password_hash,
            ..UpdateUser::default()
        },
    )
    .await?
    .ok_or_else(|| CoreError::not_found("User", member.user_id))?;

    tracing::info!(user_id = member.user_id, "Profile updated");
    Ok(keyed_with_message(
        "Profile updated",
        "user",
        load_detail(&state, member.user_id).await?,
    ))
}

/// GET /api/user/{id}
pub async fn get_by_id(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<ApiJson<Keyed<UserDetail>>> {
    Ok(keyed("user", load_detail(&state, id).await?))
}

/// PUT /api/user/{id}
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateUserRequest>,
) -> AppResult<ApiJson<Keyed<UserDetail>>> {
    ensure_unique(
        &state,
        input.employee_id.as_deref(),
        input.email.as_deref(),
        Some(id),
    )
    .await?;
    ensure_department(&state, input.department_id).await?;

    let password_hash = input.password.as_deref().map(hash).transpose()?;

    UserRepo::update(
        &state.pool,
        id,
        &UpdateUser {
            employee_id: input.employee_id,
            name: input.name,
            email: input.email,
            password_hash,
            phone: input.phone,
            department_id: input.department_id,
            branch: input.branch,
            role: input.role,
        },
    )
    .await?
    .ok_or_else(|| CoreError::not_found("User", id))?;

    tracing::info!(user_id = id, "User updated");
    Ok(keyed_with_message("User updated", "user", load_detail(&state, id).await?))
}

/// DELETE /api/user/{id}
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<ApiJson<Empty>> {
    if !UserRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("User", id).into());
    }
    tracing::info!(user_id = id, "User deleted");
    Ok(message("User deleted"))
}
