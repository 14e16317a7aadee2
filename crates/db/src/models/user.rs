//! User entity model and DTOs.

use pmdesk_core::roles::Role;
use pmdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- never serialize this to API responses.
/// Use [`UserDetail`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub department_id: Option<DbId>,
    pub branch: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation with the department name joined in.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserDetail {
    pub id: DbId,
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department_id: Option<DbId>,
    pub department_name: Option<String>,
    pub branch: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Minimal user reference embedded in project and performance views.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct UserRef {
    pub id: DbId,
    pub employee_id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub department_id: Option<DbId>,
    pub branch: Option<String>,
    pub role: Role,
}

/// Partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub employee_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub department_id: Option<DbId>,
    pub branch: Option<String>,
    pub role: Option<Role>,
}
