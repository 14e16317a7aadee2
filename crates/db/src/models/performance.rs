//! Performance (drawing output) entity model and DTOs.

use chrono::NaiveDate;
use pmdesk_core::performance::ReviewStatus;
use pmdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::user::UserRef;

/// A row from the `performances` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Performance {
    pub id: DbId,
    pub performance_code: String,
    pub project_id: DbId,
    pub user_id: DbId,
    pub drawing_type: String,
    pub drawings: i64,
    pub date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: ReviewStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Performance row with project and author fields joined in.
#[derive(Debug, Clone, FromRow)]
pub struct PerformanceRow {
    #[sqlx(flatten)]
    pub performance: Performance,
    pub project_code: Option<String>,
    pub project_name: Option<String>,
    pub employee_id: Option<String>,
    pub user_name: Option<String>,
}

/// Performance with joins and the release list expanded.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceDetail {
    #[serde(flatten)]
    pub performance: Performance,
    pub project_code: Option<String>,
    pub project_name: Option<String>,
    pub employee_id: Option<String>,
    pub user_name: Option<String>,
    pub drawing_released: Vec<UserRef>,
}

impl PerformanceDetail {
    pub fn from_row(row: PerformanceRow, drawing_released: Vec<UserRef>) -> Self {
        Self {
            performance: row.performance,
            project_code: row.project_code,
            project_name: row.project_name,
            employee_id: row.employee_id,
            user_name: row.user_name,
            drawing_released,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreatePerformance {
    pub performance_code: String,
    pub project_id: DbId,
    pub user_id: DbId,
    pub drawing_type: String,
    pub drawings: i64,
    pub date: NaiveDate,
    pub drawing_released: Vec<DbId>,
}

/// Partial update. `None` keeps the stored value; a provided release list
/// replaces the stored one.
#[derive(Debug, Clone, Default)]
pub struct UpdatePerformance {
    pub performance_code: Option<String>,
    pub project_id: Option<DbId>,
    pub drawing_type: Option<String>,
    pub drawings: Option<i64>,
    pub date: Option<NaiveDate>,
    pub status: Option<ReviewStatus>,
    pub drawing_released: Option<Vec<DbId>>,
}

/// Monthly drawing output per author.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DrawingTotal {
    pub user_id: DbId,
    pub employee_id: Option<String>,
    pub user_name: Option<String>,
    pub records: i64,
    pub drawings: i64,
    pub approved_drawings: i64,
}
