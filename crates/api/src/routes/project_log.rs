//! Route definitions for the `/project-log` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::project_log;
use crate::state::AppState;

/// Routes mounted at `/project-log`.
///
/// ```text
/// GET    /              -> list (scoped, filterable)
/// GET    /active        -> active (caller's open session)
/// POST   /start         -> start (member, project password)
/// POST   /{id}/stop     -> stop (owner)
/// DELETE /{id}          -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project_log::list))
        .route("/active", get(project_log::active))
        .route("/start", post(project_log::start))
        .route("/{id}/stop", post(project_log::stop))
        .route("/{id}", delete(project_log::delete))
}
