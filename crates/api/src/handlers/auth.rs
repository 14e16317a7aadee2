//! Handlers for admin and user login.

use axum::extract::State;
use pmdesk_core::error::CoreError;
use pmdesk_core::roles::Role;
use pmdesk_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_admin_token, generate_user_token};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::response::{keyed, with_payload, ApiJson, Keyed};
use crate::state::AppState;

/// Request body for both login endpoints.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// `POST /api/user/login` payload. Managers get `mtoken`, everyone else
/// gets `token`.
#[derive(Debug, Serialize)]
pub struct UserLogin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtoken: Option<String>,
    pub role: Role,
}

/// POST /api/admin/login
///
/// Compare against the configured admin credentials and issue an `atoken`.
pub async fn admin_login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AppResult<ApiJson<Keyed<String>>> {
    let admin = &state.config.admin;
    if !admin.matches(&input.email, &input.password) {
        tracing::warn!("Rejected admin login");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let atoken = generate_admin_token(&admin.fingerprint(), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!("Admin logged in");
    Ok(keyed("atoken", atoken))
}

/// POST /api/user/login
pub async fn user_login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AppResult<ApiJson<UserLogin>> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("No user found with this email.".into()))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Login failed: wrong password");
        return Err(CoreError::Unauthorized("Wrong password.".into()).into());
    }

    let token = generate_user_token(user.id, user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    let login = match user.role {
        Role::Manager => UserLogin {
            token: None,
            mtoken: Some(token),
            role: user.role,
        },
        Role::Admin | Role::User => UserLogin {
            token: Some(token),
            mtoken: None,
            role: user.role,
        },
    };
    Ok(with_payload(login))
}
