//! Route definitions for the `/tasks` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::task;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /               -> list (scoped, filterable)
/// POST   /               -> create (staff assign, employees self-report)
/// GET    /{id}           -> get_by_id (scoped)
/// PUT    /{id}           -> update (staff)
/// DELETE /{id}           -> delete (staff)
/// PUT    /{id}/status    -> set_status (assignee or staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(task::list).post(task::create))
        .route(
            "/{id}",
            get(task::get_by_id).put(task::update).delete(task::delete),
        )
        .route("/{id}/status", put(task::set_status))
}
