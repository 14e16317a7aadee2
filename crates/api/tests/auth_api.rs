//! Login endpoints and the token guard.

mod common;

use axum::http::StatusCode;
use common::{expect_status, get, post_json, seed_user, ADMIN_EMAIL, ADMIN_PASSWORD};
use pmdesk_api::auth::password::hash_password;
use pmdesk_core::roles::Role;
use pmdesk_db::models::user::CreateUser;
use pmdesk_db::repositories::UserRepo;
use serde_json::json;
use sqlx::SqlitePool;

/// Insert a user with a real password hash.
async fn create_login_user(pool: &SqlitePool, email: &str, role: Role) -> i64 {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            employee_id: email.split('@').next().unwrap().to_uppercase(),
            name: "Login User".into(),
            email: email.into(),
            password_hash: hash_password("correct-horse").unwrap(),
            phone: None,
            department_id: None,
            branch: None,
            role,
        },
    )
    .await
    .unwrap();
    user.id
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_login_issues_atoken(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/admin/login",
        None,
        json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
    )
    .await;

    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["success"], true);
    assert!(json["atoken"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_login_rejects_wrong_password(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/admin/login",
        None,
        json!({ "email": ADMIN_EMAIL, "password": "nope" }),
    )
    .await;

    let json = expect_status(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Invalid credentials");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_user_and_manager_login_tokens(pool: SqlitePool) {
    create_login_user(&pool, "emp@pmdesk.test", Role::User).await;
    create_login_user(&pool, "boss@pmdesk.test", Role::Manager).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/user/login",
        None,
        json!({ "email": "emp@pmdesk.test", "password": "correct-horse" }),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert!(json["token"].is_string());
    assert!(json.get("mtoken").is_none());
    assert_eq!(json["role"], "User");

    let response = post_json(
        app,
        "/api/user/login",
        None,
        json!({ "email": "boss@pmdesk.test", "password": "correct-horse" }),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert!(json["mtoken"].is_string());
    assert!(json.get("token").is_none());
    assert_eq!(json["role"], "Manager");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_user_login_failures(pool: SqlitePool) {
    create_login_user(&pool, "emp@pmdesk.test", Role::User).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/user/login",
        None,
        json!({ "email": "ghost@pmdesk.test", "password": "whatever" }),
    )
    .await;
    let json = expect_status(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["message"], "No user found with this email.");

    let response = post_json(
        app,
        "/api/user/login",
        None,
        json!({ "email": "emp@pmdesk.test", "password": "wrong-password" }),
    )
    .await;
    let json = expect_status(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["message"], "Wrong password.");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_missing_token_is_unauthorized(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let json = expect_status(get(app, "/api/projects", None).await, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Not authorized. Login again.");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_garbage_token_is_unauthorized(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app.clone(), "/api/projects", Some(("token", "not-a-jwt"))).await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;

    let response = get(app, "/api/projects", Some(("atoken", "not-a-jwt"))).await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_employee_token_in_mtoken_header_is_rejected(pool: SqlitePool) {
    let employee = seed_user(&pool, "E1", Role::User).await;
    let app = common::build_test_app(pool);

    let response = get(app, "/api/projects", Some(("mtoken", employee.token.as_str()))).await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_token_for_deleted_user_is_rejected(pool: SqlitePool) {
    let employee = seed_user(&pool, "E1", Role::User).await;
    UserRepo::delete(&pool, employee.id).await.unwrap();
    let app = common::build_test_app(pool);

    let response = get(app, "/api/user/me", employee.auth()).await;
    let json = expect_status(response, StatusCode::NOT_FOUND).await;
    assert_eq!(json["message"], "User not found");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_employee_cannot_reach_admin_routes(pool: SqlitePool) {
    let employee = seed_user(&pool, "E1", Role::User).await;
    let app = common::build_test_app(pool);

    let response = get(app, "/api/user", employee.auth()).await;
    let json = expect_status(response, StatusCode::FORBIDDEN).await;
    assert_eq!(json["success"], false);
}
