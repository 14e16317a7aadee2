//! Route definitions for the `/performances` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::performance;
use crate::state::AppState;

/// Routes mounted at `/performances`.
///
/// ```text
/// GET    /               -> list (scoped, filterable)
/// POST   /               -> create
/// GET    /report         -> report (monthly drawing totals)
/// GET    /{id}           -> get_by_id (scoped)
/// PUT    /{id}           -> update (staff, or author while pending)
/// DELETE /{id}           -> delete (staff)
/// PUT    /{id}/status    -> review (staff or listed reviewer)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(performance::list).post(performance::create))
        .route("/report", get(performance::report))
        .route(
            "/{id}",
            get(performance::get_by_id)
                .put(performance::update)
                .delete(performance::delete),
        )
        .route("/{id}/status", put(performance::review))
}
