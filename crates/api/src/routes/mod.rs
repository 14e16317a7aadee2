pub mod auth;
pub mod cost;
pub mod department;
pub mod health;
pub mod performance;
pub mod project;
pub mod project_log;
pub mod task;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /admin/login                         admin login (public)
///
/// /user/login                          user login (public)
/// /user/register                       create account (admin)
/// /user                                list users (staff)
/// /user/me                             own profile, get and edit
/// /user/{id}                           get, update, delete (admin)
///
/// /department                          list, create
/// /department/{id}                     get, update, delete
///
/// /projects                            scoped list, create
/// /projects/{id}                       get, update, delete
/// /projects/{id}/summary               cost, hours and output report
///
/// /tasks                               scoped list, create
/// /tasks/{id}                          get, update, delete
/// /tasks/{id}/status                   complete or reject
///
/// /performances                        scoped list, create
/// /performances/report                 monthly drawing totals
/// /performances/{id}                   get, update, delete
/// /performances/{id}/status            approve or reject
///
/// /cost                                scoped list, create
/// /cost/{id}                           get, update, delete
///
/// /project-log                         scoped list
/// /project-log/active                  caller's open session
/// /project-log/start                   open a session
/// /project-log/{id}/stop               close a session
/// /project-log/{id}                    delete (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/admin", auth::router())
        .nest("/user", user::router())
        .nest("/department", department::router())
        .nest("/projects", project::router())
        .nest("/tasks", task::router())
        .nest("/performances", performance::router())
        .nest("/cost", cost::router())
        .nest("/project-log", project_log::router())
}
