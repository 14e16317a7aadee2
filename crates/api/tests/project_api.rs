//! Project management and role-scoped project listing.

mod common;

use axum::http::StatusCode;
use common::{admin_token, create_project, delete, expect_status, get, post_json, put_json, seed_user};
use pmdesk_core::roles::Role;
use serde_json::json;
use sqlx::SqlitePool;

fn ids(json: &serde_json::Value, key: &str) -> Vec<i64> {
    json[key]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_project_defaults_and_members(pool: SqlitePool) {
    let manager = seed_user(&pool, "M1", Role::Manager).await;
    let employee = seed_user(&pool, "E1", Role::User).await;
    let app = common::build_test_app(pool);
    let atoken = admin_token(app.clone()).await;

    let response = post_json(
        app,
        "/api/projects",
        Some(("atoken", atoken.as_str())),
        json!({
            "project_code": "P-100",
            "name": "Bridge",
            "password": "site-pass",
            "managers": [manager.id, manager.id],
            "resources": [employee.id],
        }),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    let project = &json["project"];
    assert_eq!(project["status"], "Yet to Start");
    assert_eq!(project["current_cost"], 0.0);
    assert!(project.get("password").is_none());
    assert_eq!(project["managers"].as_array().unwrap().len(), 1);
    assert_eq!(project["resources"][0]["employee_id"], "E1");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_project_rejects_unknown_member(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let atoken = admin_token(app.clone()).await;

    let response = post_json(
        app,
        "/api/projects",
        Some(("atoken", atoken.as_str())),
        json!({
            "project_code": "P-1",
            "name": "Ghost crew",
            "password": "pw",
            "resources": [999],
        }),
    )
    .await;
    let json = expect_status(response, StatusCode::NOT_FOUND).await;
    assert_eq!(json["message"], "User not found");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_project_list_is_scoped_by_role(pool: SqlitePool) {
    let manager = seed_user(&pool, "M1", Role::Manager).await;
    let employee = seed_user(&pool, "E1", Role::User).await;
    let outsider = seed_user(&pool, "E2", Role::User).await;
    let app = common::build_test_app(pool);
    let atoken = admin_token(app.clone()).await;

    let managed = create_project(app.clone(), &atoken, "P-1", &[manager.id], &[]).await;
    let staffed = create_project(app.clone(), &atoken, "P-2", &[], &[employee.id]).await;

    let json = expect_status(
        get(app.clone(), "/api/projects", Some(("atoken", atoken.as_str()))).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(ids(&json, "projects").len(), 2);

    let json = expect_status(get(app.clone(), "/api/projects", manager.auth()).await, StatusCode::OK).await;
    assert_eq!(ids(&json, "projects"), vec![managed]);

    let json = expect_status(get(app.clone(), "/api/projects", employee.auth()).await, StatusCode::OK).await;
    assert_eq!(ids(&json, "projects"), vec![staffed]);

    let json = expect_status(get(app.clone(), "/api/projects", outsider.auth()).await, StatusCode::OK).await;
    assert!(ids(&json, "projects").is_empty());

    let response = get(app, &format!("/api/projects/{staffed}"), outsider.auth()).await;
    expect_status(response, StatusCode::FORBIDDEN).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_replaces_member_list_and_keeps_cost(pool: SqlitePool) {
    let first = seed_user(&pool, "E1", Role::User).await;
    let second = seed_user(&pool, "E2", Role::User).await;
    let app = common::build_test_app(pool);
    let atoken = admin_token(app.clone()).await;
    let admin = Some(("atoken", atoken.as_str()));
    let id = create_project(app.clone(), &atoken, "P-1", &[], &[first.id]).await;

    let response = put_json(
        app.clone(),
        &format!("/api/projects/{id}"),
        admin,
        json!({ "resources": [second.id], "status": "In Progress" }),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["project"]["status"], "In Progress");
    assert_eq!(ids(&json["project"], "resources"), vec![second.id]);

    // current_cost is derived and cannot be written directly.
    let response = put_json(
        app,
        &format!("/api/projects/{id}"),
        admin,
        json!({ "current_cost": 99.0 }),
    )
    .await;
    expect_status(response, StatusCode::BAD_REQUEST).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_summary_and_delete(pool: SqlitePool) {
    let manager = seed_user(&pool, "M1", Role::Manager).await;
    let app = common::build_test_app(pool);
    let atoken = admin_token(app.clone()).await;
    let admin = Some(("atoken", atoken.as_str()));
    let id = create_project(app.clone(), &atoken, "P-1", &[manager.id], &[]).await;

    let response = get(app.clone(), &format!("/api/projects/{id}/summary"), manager.auth()).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["summary"]["cost_remaining"], 1000.0);
    assert_eq!(json["summary"]["tasks"]["pending"], 0);

    let json = expect_status(delete(app.clone(), &format!("/api/projects/{id}"), admin).await, StatusCode::OK).await;
    assert_eq!(json["message"], "Project deleted");

    expect_status(get(app, &format!("/api/projects/{id}"), admin).await, StatusCode::NOT_FOUND).await;
}
