//! Token-based authentication extractor for Axum handlers.
//!
//! Three headers carry credentials: `atoken` (admin), `mtoken` (manager)
//! and `token` (any user). The first one present, in that order, decides
//! the caller. A request with none of them is [`Identity::Anonymous`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use pmdesk_core::error::CoreError;
use pmdesk_core::identity::Identity;
use pmdesk_db::repositories::UserRepo;

use crate::auth::jwt::{validate_admin_token, validate_user_token};
use crate::error::AppError;
use crate::state::AppState;

pub const ADMIN_TOKEN_HEADER: &str = "atoken";
pub const MANAGER_TOKEN_HEADER: &str = "mtoken";
pub const USER_TOKEN_HEADER: &str = "token";

const LOGIN_AGAIN: &str = "Not authorized. Login again.";

/// The resolved caller of a request. Never rejects on a missing header.
///
/// ```ignore
/// async fn my_handler(Caller(identity): Caller) -> AppResult<...> {
///     let scope = identity.list_scope()?;
///     ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Identity);

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(token) = header_token(parts, ADMIN_TOKEN_HEADER) {
            let claims = validate_admin_token(token, &state.config.jwt)
                .map_err(|_| AppError::unauthorized(LOGIN_AGAIN))?;
            if claims.fingerprint != state.config.admin.fingerprint() {
                return Err(AppError::unauthorized(LOGIN_AGAIN));
            }
            return Ok(Caller(Identity::Admin));
        }

        if let Some(token) = header_token(parts, MANAGER_TOKEN_HEADER) {
            let identity = resolve_user(token, state).await?;
            if !matches!(identity, Identity::Manager { .. }) {
                return Err(AppError::unauthorized(LOGIN_AGAIN));
            }
            return Ok(Caller(identity));
        }

        if let Some(token) = header_token(parts, USER_TOKEN_HEADER) {
            return Ok(Caller(resolve_user(token, state).await?));
        }

        Ok(Caller(Identity::Anonymous))
    }
}

/// Header value with an optional `Bearer ` prefix stripped. Blank values
/// count as absent.
fn header_token<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    let raw = parts.headers.get(name)?.to_str().ok()?.trim();
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    (!token.is_empty()).then_some(token)
}

/// Verify a user token and load the user it names. The stored role, not
/// the role in the claims, decides the identity.
async fn resolve_user(token: &str, state: &AppState) -> Result<Identity, AppError> {
    let claims = validate_user_token(token, &state.config.jwt)
        .map_err(|_| AppError::unauthorized(LOGIN_AGAIN))?;

    let user = UserRepo::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(|| CoreError::not_found("User", claims.sub))?;

    if user.role.as_str() != claims.role {
        tracing::debug!(
            user_id = user.id,
            token_role = %claims.role,
            stored_role = %user.role,
            "Role changed since token was issued"
        );
    }

    Ok(Identity::for_user(user.id, user.role))
}

