//! Time-tracking log model and DTOs.

use pmdesk_core::timelog::LogState;
use pmdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `project_logs` table. Open while `end_time` is unset.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectLog {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    /// Elapsed hours, set when the log is closed.
    pub total_time: Option<f64>,
    pub created_at: Timestamp,
}

impl ProjectLog {
    pub fn state(&self) -> LogState {
        LogState::of(self.end_time)
    }
}

/// Log with project and user fields joined in.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectLogDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub log: ProjectLog,
    pub project_code: Option<String>,
    pub project_name: Option<String>,
    pub employee_id: Option<String>,
    pub user_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateProjectLog {
    pub project_id: DbId,
    pub user_id: DbId,
    pub start_time: Timestamp,
}
