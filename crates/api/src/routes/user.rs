//! Route definitions for the `/user` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, user};
use crate::state::AppState;

/// Routes mounted at `/user`.
///
/// ```text
/// POST   /login       -> user_login (public)
/// POST   /register    -> register (admin)
/// GET    /            -> list (staff)
/// GET    /me          -> me (member)
/// PUT    /me          -> update_me (member)
/// GET    /{id}        -> get_by_id (admin)
/// PUT    /{id}        -> update (admin)
/// DELETE /{id}        -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::user_login))
        .route("/register", post(user::register))
        .route("/", get(user::list))
        .route("/me", get(user::me).put(user::update_me))
        .route(
            "/{id}",
            get(user::get_by_id).put(user::update).delete(user::delete),
        )
}
