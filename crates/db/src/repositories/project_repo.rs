//! Repository for the `projects` and `project_members` tables.

use std::collections::HashMap;

use chrono::Utc;
use pmdesk_core::identity::ListScope;
use pmdesk_core::project::Assignment;
use pmdesk_core::types::DbId;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::models::project::{
    CreateProject, DrawingTally, MemberRow, Members, Project, ProjectDetail, ProjectSummary,
    TaskTally, UpdateProject,
};
use crate::models::user::UserRef;
use crate::repositories::predicates::{push_id_list, push_member_of, push_supervises};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_code, name, password, description, remark, estimated_cost, \
                       current_cost, estimated_hours, current_hours, status, created_at, updated_at";

/// Provides CRUD operations for projects and their assignment lists.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project and its assignment lists, returning the created row.
    pub async fn create(pool: &SqlitePool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO projects (project_code, name, password, description, remark, \
                                   estimated_cost, current_cost, estimated_hours, current_hours, \
                                   status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $8, $9, $10, $10)
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(&input.project_code)
            .bind(&input.name)
            .bind(&input.password)
            .bind(&input.description)
            .bind(&input.remark)
            .bind(input.estimated_cost)
            .bind(input.estimated_hours)
            .bind(input.current_hours)
            .bind(&input.status)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        for (assignment, ids) in input.members.by_assignment() {
            replace_assignment(&mut *tx, project.id, assignment, ids).await?;
        }

        tx.commit().await?;
        Ok(project)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE project_code = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// One project with assignment lists expanded.
    pub async fn find_detail(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<ProjectDetail>, sqlx::Error> {
        let Some(project) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let mut details = attach_members(pool, vec![project]).await?;
        Ok(details.pop())
    }

    /// Projects visible in `scope`, newest first. `member` narrows the list to
    /// projects where that user holds any assignment.
    pub async fn list(
        pool: &SqlitePool,
        scope: ListScope,
        member: Option<DbId>,
    ) -> Result<Vec<ProjectDetail>, sqlx::Error> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {COLUMNS} FROM projects p WHERE 1 = 1"
        ));
        match scope {
            ListScope::All => {}
            ListScope::Managed(user_id) => {
                qb.push(" AND ");
                push_supervises(&mut qb, "p.id", user_id);
            }
            ListScope::Own(user_id) => {
                qb.push(" AND ");
                push_member_of(&mut qb, "p.id", user_id);
            }
        }
        if let Some(user_id) = member {
            qb.push(" AND ");
            push_member_of(&mut qb, "p.id", user_id);
        }
        qb.push(" ORDER BY p.created_at DESC, p.id DESC");

        let projects = qb.build_query_as::<Project>().fetch_all(pool).await?;
        attach_members(pool, projects).await
    }

    /// Assignment lists of one project, by user id.
    pub async fn members(pool: &SqlitePool, project_id: DbId) -> Result<Members, sqlx::Error> {
        let rows = member_rows(pool, &[project_id]).await?;
        let mut members = Members::default();
        for row in rows {
            match row.assignment {
                Assignment::Manager => members.managers.push(row.id),
                Assignment::TeamLead => members.team_leads.push(row.id),
                Assignment::Resource => members.resources.push(row.id),
            }
        }
        Ok(members)
    }

    /// Whether `user_id` is a manager or team lead on the project.
    pub async fn is_supervisor(
        pool: &SqlitePool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM project_members
                            WHERE project_id = $1 AND user_id = $2
                            AND assignment IN ('manager', 'team_lead'))",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied;
    /// provided assignment lists replace the stored ones.
    ///
    /// `current_cost` is never written here. Returns `None` if no row with the
    /// given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE projects SET
                project_code = COALESCE($2, project_code),
                name = COALESCE($3, name),
                password = COALESCE($4, password),
                description = COALESCE($5, description),
                remark = COALESCE($6, remark),
                estimated_cost = COALESCE($7, estimated_cost),
                estimated_hours = COALESCE($8, estimated_hours),
                current_hours = COALESCE($9, current_hours),
                status = COALESCE($10, status),
                updated_at = $11
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.project_code)
            .bind(&input.name)
            .bind(&input.password)
            .bind(&input.description)
            .bind(&input.remark)
            .bind(input.estimated_cost)
            .bind(input.estimated_hours)
            .bind(input.current_hours)
            .bind(&input.status)
            .bind(Utc::now())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(project) = project else {
            return Ok(None);
        };

        let lists = [
            (Assignment::Manager, &input.managers),
            (Assignment::TeamLead, &input.team_leads),
            (Assignment::Resource, &input.resources),
        ];
        for (assignment, ids) in lists {
            if let Some(ids) = ids {
                replace_assignment(&mut *tx, id, assignment, ids).await?;
            }
        }

        tx.commit().await?;
        Ok(Some(project))
    }

    /// Delete a project and its assignment rows. Tasks, costs, performances
    /// and logs that reference it are left orphaned.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM project_members WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Reporting view: cost, hours, task and drawing totals for one project.
    pub async fn summary(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<ProjectSummary>, sqlx::Error> {
        let Some(project) = Self::find_detail(pool, id).await? else {
            return Ok(None);
        };

        let cost_entries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM costs WHERE project_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;

        let (logged_hours, open_sessions): (f64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_time), 0.0),
                    COALESCE(SUM(CASE WHEN end_time IS NULL THEN 1 ELSE 0 END), 0)
             FROM project_logs WHERE project_id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        let tasks = sqlx::query_as::<_, TaskTally>(
            "SELECT COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending,
                    COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0) AS completed,
                    COALESCE(SUM(CASE WHEN status = 'rejected' THEN 1 ELSE 0 END), 0) AS rejected
             FROM tasks WHERE project_id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        let drawings = sqlx::query_as::<_, DrawingTally>(
            "SELECT COALESCE(SUM(CASE WHEN status = 'pending' THEN drawings ELSE 0 END), 0) AS pending,
                    COALESCE(SUM(CASE WHEN status = 'approved' THEN drawings ELSE 0 END), 0) AS approved,
                    COALESCE(SUM(CASE WHEN status = 'rejected' THEN drawings ELSE 0 END), 0) AS rejected
             FROM performances WHERE project_id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        let cost_remaining = project.project.estimated_cost - project.project.current_cost;

        Ok(Some(ProjectSummary {
            project,
            cost_entries,
            cost_remaining,
            logged_hours,
            open_sessions,
            tasks,
            drawings,
        }))
    }
}

/// Replace one assignment list of a project inside an open transaction.
async fn replace_assignment(
    conn: &mut SqliteConnection,
    project_id: DbId,
    assignment: Assignment,
    user_ids: &[DbId],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND assignment = $2")
        .bind(project_id)
        .bind(assignment.as_str())
        .execute(&mut *conn)
        .await?;

    for user_id in user_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO project_members (project_id, user_id, assignment)
             VALUES ($1, $2, $3)",
        )
        .bind(project_id)
        .bind(*user_id)
        .bind(assignment.as_str())
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Membership rows for a set of projects. Members whose user record is gone
/// are dropped by the join.
async fn member_rows(
    pool: &SqlitePool,
    project_ids: &[DbId],
) -> Result<Vec<MemberRow>, sqlx::Error> {
    if project_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
        "SELECT pm.project_id, pm.assignment, u.id, u.employee_id, u.name
         FROM project_members pm
         JOIN users u ON u.id = pm.user_id
         WHERE pm.project_id IN ",
    );
    push_id_list(&mut qb, project_ids);
    qb.push(" ORDER BY u.name");
    qb.build_query_as::<MemberRow>().fetch_all(pool).await
}

async fn attach_members(
    pool: &SqlitePool,
    projects: Vec<Project>,
) -> Result<Vec<ProjectDetail>, sqlx::Error> {
    let ids: Vec<DbId> = projects.iter().map(|p| p.id).collect();
    let mut grouped: HashMap<DbId, Vec<MemberRow>> = HashMap::new();
    for row in member_rows(pool, &ids).await? {
        grouped.entry(row.project_id).or_default().push(row);
    }

    Ok(projects
        .into_iter()
        .map(|project| {
            let mut detail = ProjectDetail {
                managers: Vec::new(),
                team_leads: Vec::new(),
                resources: Vec::new(),
                project,
            };
            for row in grouped.remove(&detail.project.id).unwrap_or_default() {
                let user = UserRef {
                    id: row.id,
                    employee_id: row.employee_id,
                    name: row.name,
                };
                match row.assignment {
                    Assignment::Manager => detail.managers.push(user),
                    Assignment::TeamLead => detail.team_leads.push(user),
                    Assignment::Resource => detail.resources.push(user),
                }
            }
            detail
        })
        .collect())
}
