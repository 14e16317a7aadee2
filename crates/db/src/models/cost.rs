//! Cost entry model and DTOs.

use pmdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `costs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Cost {
    pub id: DbId,
    pub cost_code: String,
    pub project_id: DbId,
    pub name: String,
    pub amount: f64,
    pub added_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Cost with project and author fields joined in.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CostDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub cost: Cost,
    pub project_code: Option<String>,
    pub project_name: Option<String>,
    pub added_by_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateCost {
    pub cost_code: String,
    pub project_id: DbId,
    pub name: String,
    pub amount: f64,
    pub added_by: Option<DbId>,
}

/// Partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateCost {
    pub cost_code: Option<String>,
    pub project_id: Option<DbId>,
    pub name: Option<String>,
    pub amount: Option<f64>,
}
