//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`Caller`] and rejects requests whose identity does
//! not meet the requirement: anonymous callers get 401, authenticated
//! callers without the role get 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use pmdesk_core::identity::Identity;
use pmdesk_core::types::DbId;

use super::auth::Caller;
use crate::error::AppError;
use crate::state::AppState;

async fn authenticated(parts: &mut Parts, state: &AppState) -> Result<Identity, AppError> {
    let Caller(identity) = Caller::from_request_parts(parts, state).await?;
    if identity.is_anonymous() {
        return Err(AppError::unauthorized("Not authorized. Login again."));
    }
    Ok(identity)
}

/// Requires the admin identity.
///
/// ```ignore
/// async fn admin_only(_admin: RequireAdmin) -> AppResult<...> { ... }
/// ```
pub struct RequireAdmin(pub Identity);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = authenticated(parts, state).await?;
        if !identity.is_admin() {
            return Err(AppError::forbidden("Admin role required"));
        }
        Ok(RequireAdmin(identity))
    }
}

/// Requires an admin or a manager.
pub struct RequireStaff(pub Identity);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = authenticated(parts, state).await?;
        if !identity.is_staff() {
            return Err(AppError::forbidden("Manager or Admin role required"));
        }
        Ok(RequireStaff(identity))
    }
}

/// Requires a caller backed by a user record (manager or employee).
pub struct RequireMember {
    pub identity: Identity,
    pub user_id: DbId,
}

impl FromRequestParts<AppState> for RequireMember {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = authenticated(parts, state).await?;
        let user_id = identity
            .user_id()
            .ok_or_else(|| AppError::forbidden("A user account is required"))?;
        Ok(RequireMember { identity, user_id })
    }
}

/// Requires any authenticated caller.
pub struct RequireAuth(pub Identity);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequireAuth(authenticated(parts, state).await?))
    }
}
