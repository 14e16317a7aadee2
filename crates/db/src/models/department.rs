//! Department entity model and DTOs.

use pmdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `departments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Department {
    pub id: DbId,
    pub department_code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_management: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateDepartment {
    pub department_code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_management: bool,
}

/// Partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateDepartment {
    pub department_code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_management: Option<bool>,
}
