#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use pmdesk_api::auth::jwt::{generate_user_token, JwtConfig};
use pmdesk_api::config::{AdminCredentials, ServerConfig};
use pmdesk_api::router::build_app_router;
use pmdesk_api::state::AppState;
use pmdesk_core::roles::Role;
use pmdesk_core::types::DbId;
use pmdesk_db::models::user::CreateUser;
use pmdesk_db::repositories::UserRepo;

pub const ADMIN_EMAIL: &str = "admin@pmdesk.test";
pub const ADMIN_PASSWORD: &str = "admin-password-123";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            expiry_hours: 1,
        },
        admin: AdminCredentials {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        },
    }
}

/// Build the full application router with the production middleware stack
/// on top of the given pool.
pub fn build_test_app(pool: SqlitePool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Credential header for a request: `("atoken" | "mtoken" | "token", value)`.
pub type Auth<'a> = Option<(&'a str, &'a str)>;

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    auth: Auth<'_>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((header, value)) = auth {
        builder = builder.header(header, value);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, auth: Auth<'_>) -> Response {
    send(app, Method::GET, uri, auth, None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    auth: Auth<'_>,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, auth, Some(body)).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    auth: Auth<'_>,
    body: serde_json::Value,
) -> Response {
    send(app, Method::PUT, uri, auth, Some(body)).await
}

pub async fn delete(app: Router, uri: &str, auth: Auth<'_>) -> Response {
    send(app, Method::DELETE, uri, auth, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status, then return the parsed body.
pub async fn expect_status(response: Response, status: StatusCode) -> serde_json::Value {
    let actual = response.status();
    let json = body_json(response).await;
    assert_eq!(actual, status, "unexpected status, body: {json}");
    json
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Log in as the configured admin and return the `atoken`.
pub async fn admin_token(app: Router) -> String {
    let response = post_json(
        app,
        "/api/admin/login",
        None,
        serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    json["atoken"].as_str().unwrap().to_string()
}

/// A seeded user together with the header that authenticates them.
pub struct Seeded {
    pub id: DbId,
    pub token: String,
    pub header: &'static str,
}

impl Seeded {
    pub fn auth(&self) -> Auth<'_> {
        Some((self.header, self.token.as_str()))
    }
}

/// Insert a user directly and mint a token for them. The stored hash is not
/// a real one; use the login endpoint tests for password checks.
pub async fn seed_user(pool: &SqlitePool, employee_id: &str, role: Role) -> Seeded {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            employee_id: employee_id.to_string(),
            name: format!("User {employee_id}"),
            email: format!("{}@pmdesk.test", employee_id.to_lowercase()),
            password_hash: "not-a-real-hash".to_string(),
            phone: None,
            department_id: None,
            branch: None,
            role,
        },
    )
    .await
    .expect("user creation should succeed");

    let token = generate_user_token(user.id, role, &test_config().jwt).unwrap();
    let header = match role {
        Role::Manager => "mtoken",
        Role::Admin | Role::User => "token",
    };
    Seeded {
        id: user.id,
        token,
        header,
    }
}

/// Create a project through the API as admin and return its id.
pub async fn create_project(
    app: Router,
    atoken: &str,
    code: &str,
    managers: &[DbId],
    resources: &[DbId],
) -> DbId {
    let response = post_json(
        app,
        "/api/projects",
        Some(("atoken", atoken)),
        serde_json::json!({
            "project_code": code,
            "name": format!("Project {code}"),
            "password": "site-pass",
            "estimated_cost": 1000.0,
            "managers": managers,
            "resources": resources,
        }),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    json["project"]["id"].as_i64().unwrap()
}
