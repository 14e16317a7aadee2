//! Route definitions for the `/admin` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// POST /login    -> admin_login
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(auth::admin_login))
}
