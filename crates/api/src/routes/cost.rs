//! Route definitions for the `/cost` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::cost;
use crate::state::AppState;

/// Routes mounted at `/cost`.
///
/// ```text
/// GET    /        -> list (scoped, filterable)
/// POST   /        -> create (staff)
/// GET    /{id}    -> get_by_id (scoped)
/// PUT    /{id}    -> update (staff)
/// DELETE /{id}    -> delete (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cost::list).post(cost::create))
        .route(
            "/{id}",
            get(cost::get_by_id).put(cost::update).delete(cost::delete),
        )
}
