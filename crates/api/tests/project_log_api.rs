//! Password-gated time logs.

mod common;

use axum::http::StatusCode;
use common::{admin_token, create_project, delete, expect_status, get, post_json, seed_user};
use pmdesk_core::roles::Role;
use pmdesk_db::repositories::ProjectLogRepo;
use serde_json::json;
use sqlx::SqlitePool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_wrong_password_writes_no_log(pool: SqlitePool) {
    let employee = seed_user(&pool, "E1", Role::User).await;
    let app = common::build_test_app(pool.clone());
    let atoken = admin_token(app.clone()).await;
    let project = create_project(app.clone(), &atoken, "P-1", &[], &[employee.id]).await;

    let response = post_json(
        app,
        "/api/project-log/start",
        employee.auth(),
        json!({ "project_id": project, "password": "guess" }),
    )
    .await;
    let json = expect_status(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["message"], "Incorrect project password");

    let logs = ProjectLogRepo::list(
        &pool,
        pmdesk_core::identity::ListScope::All,
        &Default::default(),
    )
    .await
    .unwrap();
    assert!(logs.is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_start_stop_computes_hours(pool: SqlitePool) {
    let employee = seed_user(&pool, "E1", Role::User).await;
    let app = common::build_test_app(pool);
    let atoken = admin_token(app.clone()).await;
    let project = create_project(app.clone(), &atoken, "P-1", &[], &[employee.id]).await;

    let response = post_json(
        app.clone(),
        "/api/project-log/start",
        employee.auth(),
        json!({
            "project_id": project,
            "password": "site-pass",
            "start_time": "2026-05-04T08:00:00Z",
        }),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert!(json["log"]["end_time"].is_null());
    let id = json["log"]["id"].as_i64().unwrap();

    let response = post_json(
        app.clone(),
        "/api/project-log/start",
        employee.auth(),
        json!({ "project_id": project, "password": "site-pass" }),
    )
    .await;
    expect_status(response, StatusCode::CONFLICT).await;

    let json = expect_status(get(app.clone(), "/api/project-log/active", employee.auth()).await, StatusCode::OK).await;
    assert_eq!(json["log"]["id"], id);

    let stop_uri = format!("/api/project-log/{id}/stop");
    let response = post_json(
        app.clone(),
        &stop_uri,
        employee.auth(),
        json!({ "end_time": "2026-05-04T10:30:00Z" }),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["log"]["total_time"], 2.5);

    let response = post_json(app.clone(), &stop_uri, employee.auth(), json!({})).await;
    let json = expect_status(response, StatusCode::CONFLICT).await;
    assert_eq!(json["message"], "Time log is already closed");

    let json = expect_status(get(app, "/api/project-log/active", employee.auth()).await, StatusCode::OK).await;
    assert!(json["log"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_only_owner_stops_and_admin_deletes(pool: SqlitePool) {
    let owner = seed_user(&pool, "E1", Role::User).await;
    let other = seed_user(&pool, "E2", Role::User).await;
    let app = common::build_test_app(pool);
    let atoken = admin_token(app.clone()).await;
    let admin = Some(("atoken", atoken.as_str()));
    let project = create_project(app.clone(), &atoken, "P-1", &[], &[owner.id]).await;

    let response = post_json(
        app.clone(),
        "/api/project-log/start",
        owner.auth(),
        json!({ "project_id": project, "password": "site-pass" }),
    )
    .await;
    let id = expect_status(response, StatusCode::OK).await["log"]["id"].as_i64().unwrap();

    let response = post_json(app.clone(), &format!("/api/project-log/{id}/stop"), other.auth(), json!({})).await;
    expect_status(response, StatusCode::FORBIDDEN).await;

    let json = expect_status(get(app.clone(), "/api/project-log", other.auth()).await, StatusCode::OK).await;
    assert!(json["logs"].as_array().unwrap().is_empty());

    let json = expect_status(get(app.clone(), "/api/project-log", owner.auth()).await, StatusCode::OK).await;
    assert_eq!(json["logs"].as_array().unwrap().len(), 1);

    let uri = format!("/api/project-log/{id}");
    expect_status(delete(app.clone(), &uri, owner.auth()).await, StatusCode::FORBIDDEN).await;
    let json = expect_status(delete(app, &uri, admin).await, StatusCode::OK).await;
    assert_eq!(json["message"], "Time log deleted");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_project_is_not_found(pool: SqlitePool) {
    let employee = seed_user(&pool, "E1", Role::User).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/project-log/start",
        employee.auth(),
        json!({ "project_id": 77, "password": "anything" }),
    )
    .await;
    let json = expect_status(response, StatusCode::NOT_FOUND).await;
    assert_eq!(json["message"], "Project not found");
}
