use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted and the config sits
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: pmdesk_db::DbPool,
    /// Server configuration (JWT secret, admin credentials, ...).
    pub config: Arc<ServerConfig>,
}
