//! Cost entries and the project `current_cost` roll-up.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{admin_token, create_project, delete, expect_status, get, post_json, put_json, seed_user, Auth};
use pmdesk_core::roles::Role;
use serde_json::json;
use sqlx::SqlitePool;

async fn current_cost(app: Router, auth: Auth<'_>, project: i64) -> f64 {
    let json = expect_status(get(app, &format!("/api/projects/{project}"), auth).await, StatusCode::OK).await;
    json["project"]["current_cost"].as_f64().unwrap()
}

async fn add_cost(app: Router, auth: Auth<'_>, code: &str, project: i64, amount: f64) -> i64 {
    let response = post_json(
        app,
        "/api/cost",
        auth,
        json!({ "cost_code": code, "project_id": project, "name": "Materials", "amount": amount }),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    json["cost"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_current_cost_follows_every_write(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let atoken = admin_token(app.clone()).await;
    let admin = Some(("atoken", atoken.as_str()));
    let first = create_project(app.clone(), &atoken, "P-1", &[], &[]).await;
    let second = create_project(app.clone(), &atoken, "P-2", &[], &[]).await;

    let a = add_cost(app.clone(), admin, "C-1", first, 120.5).await;
    add_cost(app.clone(), admin, "C-2", first, 79.5).await;
    assert_eq!(current_cost(app.clone(), admin, first).await, 200.0);

    let response = put_json(app.clone(), &format!("/api/cost/{a}"), admin, json!({ "amount": 20.5 })).await;
    expect_status(response, StatusCode::OK).await;
    assert_eq!(current_cost(app.clone(), admin, first).await, 100.0);

    // Moving a cost refreshes both projects.
    let response = put_json(app.clone(), &format!("/api/cost/{a}"), admin, json!({ "project_id": second })).await;
    expect_status(response, StatusCode::OK).await;
    assert_eq!(current_cost(app.clone(), admin, first).await, 79.5);
    assert_eq!(current_cost(app.clone(), admin, second).await, 20.5);

    let json = expect_status(delete(app.clone(), &format!("/api/cost/{a}"), admin).await, StatusCode::OK).await;
    assert_eq!(json["message"], "Cost deleted");
    assert_eq!(current_cost(app, admin, second).await, 0.0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_cost_validation(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let atoken = admin_token(app.clone()).await;
    let admin = Some(("atoken", atoken.as_str()));
    let project = create_project(app.clone(), &atoken, "P-1", &[], &[]).await;

    let response = post_json(
        app.clone(),
        "/api/cost",
        admin,
        json!({ "cost_code": "C-1", "project_id": project, "name": "Refund", "amount": -5.0 }),
    )
    .await;
    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["message"], "Amount cannot be negative");

    let response = post_json(
        app.clone(),
        "/api/cost",
        admin,
        json!({ "cost_code": "C-1", "project_id": 404, "name": "Lost", "amount": 5.0 }),
    )
    .await;
    let json = expect_status(response, StatusCode::NOT_FOUND).await;
    assert_eq!(json["message"], "Project not found");

    add_cost(app.clone(), admin, "C-1", project, 1.0).await;
    let response = post_json(
        app,
        "/api/cost",
        admin,
        json!({ "cost_code": "C-1", "project_id": project, "name": "Again", "amount": 1.0 }),
    )
    .await;
    let json = expect_status(response, StatusCode::CONFLICT).await;
    assert_eq!(json["message"], "Cost already exists");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_cost_visibility_by_role(pool: SqlitePool) {
    let manager = seed_user(&pool, "M1", Role::Manager).await;
    let other_manager = seed_user(&pool, "M2", Role::Manager).await;
    let employee = seed_user(&pool, "E1", Role::User).await;
    let app = common::build_test_app(pool);
    let atoken = admin_token(app.clone()).await;
    let project = create_project(app.clone(), &atoken, "P-1", &[manager.id], &[employee.id]).await;

    let id = add_cost(app.clone(), Some(("atoken", atoken.as_str())), "C-1", project, 50.0).await;

    let json = expect_status(get(app.clone(), "/api/cost", manager.auth()).await, StatusCode::OK).await;
    assert_eq!(json["costs"].as_array().unwrap().len(), 1);
    assert_eq!(json["costs"][0]["project_code"], "P-1");

    let json = expect_status(get(app.clone(), "/api/cost", other_manager.auth()).await, StatusCode::OK).await;
    assert!(json["costs"].as_array().unwrap().is_empty());

    let response = get(app.clone(), &format!("/api/cost/{id}"), other_manager.auth()).await;
    expect_status(response, StatusCode::FORBIDDEN).await;

    let response = post_json(
        app,
        "/api/cost",
        employee.auth(),
        json!({ "cost_code": "C-2", "project_id": project, "name": "Taxi", "amount": 12.0 }),
    )
    .await;
    expect_status(response, StatusCode::FORBIDDEN).await;
}
