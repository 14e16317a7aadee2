//! Project entity model and DTOs.

use pmdesk_core::project::Assignment;
use pmdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::user::UserRef;

/// A row from the `projects` table.
///
/// `current_cost` is derived from the project's cost rows and only written by
/// the cost repository.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub project_code: String,
    pub name: String,
    /// Plaintext time-tracking password; never sent back to clients.
    #[serde(skip_serializing)]
    pub password: String,
    pub description: Option<String>,
    pub remark: Option<String>,
    pub estimated_cost: f64,
    pub current_cost: f64,
    pub estimated_hours: f64,
    pub current_hours: f64,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Project with its assignment lists expanded to user references.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub managers: Vec<UserRef>,
    pub team_leads: Vec<UserRef>,
    pub resources: Vec<UserRef>,
}

/// One membership row joined with the member's user fields.
#[derive(Debug, Clone, FromRow)]
pub struct MemberRow {
    pub project_id: DbId,
    #[sqlx(try_from = "String")]
    pub assignment: Assignment,
    pub id: DbId,
    pub employee_id: String,
    pub name: String,
}

/// The three assignment lists of a project, by user id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Members {
    pub managers: Vec<DbId>,
    pub team_leads: Vec<DbId>,
    pub resources: Vec<DbId>,
}

impl Members {
    pub fn by_assignment(&self) -> [(Assignment, &[DbId]); 3] {
        [
            (Assignment::Manager, self.managers.as_slice()),
            (Assignment::TeamLead, self.team_leads.as_slice()),
            (Assignment::Resource, self.resources.as_slice()),
        ]
    }

    /// Every referenced user id, possibly with repeats across lists.
    pub fn all_ids(&self) -> impl Iterator<Item = DbId> + '_ {
        self.managers
            .iter()
            .chain(&self.team_leads)
            .chain(&self.resources)
            .copied()
    }
}

#[derive(Debug, Clone)]
pub struct CreateProject {
    pub project_code: String,
    pub name: String,
    pub password: String,
    pub description: Option<String>,
    pub remark: Option<String>,
    pub estimated_cost: f64,
    pub estimated_hours: f64,
    pub current_hours: f64,
    pub status: String,
    pub members: Members,
}

/// Partial update. `None` keeps the stored value; a provided member list
/// replaces that list entirely.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub project_code: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub description: Option<String>,
    pub remark: Option<String>,
    pub estimated_cost: Option<f64>,
    pub estimated_hours: Option<f64>,
    pub current_hours: Option<f64>,
    pub status: Option<String>,
    pub managers: Option<Vec<DbId>>,
    pub team_leads: Option<Vec<DbId>>,
    pub resources: Option<Vec<DbId>>,
}

/// Task counts per status for a project summary.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct TaskTally {
    pub pending: i64,
    pub completed: i64,
    pub rejected: i64,
}

/// Drawing totals per review status for a project summary.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct DrawingTally {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

/// Reporting view of one project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub project: ProjectDetail,
    pub cost_entries: i64,
    /// `estimated_cost - current_cost`; negative when over budget.
    pub cost_remaining: f64,
    /// Hours from closed time logs.
    pub logged_hours: f64,
    pub open_sessions: i64,
    pub tasks: TaskTally,
    pub drawings: DrawingTally,
}
