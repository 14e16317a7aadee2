//! Repository for the `project_logs` table.

use chrono::Utc;
use pmdesk_core::filter::ListCriteria;
use pmdesk_core::identity::ListScope;
use pmdesk_core::timelog::elapsed_hours;
use pmdesk_core::types::{DbId, Timestamp};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::project_log::{CreateProjectLog, ProjectLog, ProjectLogDetail};
use crate::repositories::predicates::{
    push_criteria, push_supervises, DateColumn, FilterColumns,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, user_id, start_time, end_time, total_time, created_at";

const DETAIL_SELECT: &str = "SELECT l.id, l.project_id, l.user_id, l.start_time, l.end_time, \
        l.total_time, l.created_at, \
        p.project_code, p.name AS project_name, u.employee_id, u.name AS user_name \
     FROM project_logs l \
     LEFT JOIN projects p ON p.id = l.project_id \
     LEFT JOIN users u ON u.id = l.user_id";

const FILTER_COLUMNS: FilterColumns = FilterColumns {
    project: "l.project_id",
    user: "l.user_id",
    employee: "u.employee_id",
    date: DateColumn::Timestamp("l.start_time"),
};

/// Provides operations for time-tracking sessions.
pub struct ProjectLogRepo;

impl ProjectLogRepo {
    /// Open a new session.
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateProjectLog,
    ) -> Result<ProjectLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_logs (project_id, user_id, start_time, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectLog>(&query)
            .bind(input.project_id)
            .bind(input.user_id)
            .bind(input.start_time)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<ProjectLog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM project_logs WHERE id = $1");
        sqlx::query_as::<_, ProjectLog>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_detail(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<ProjectLogDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE l.id = $1");
        sqlx::query_as::<_, ProjectLogDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The user's most recent open session, optionally on one project.
    pub async fn find_open(
        pool: &SqlitePool,
        user_id: DbId,
        project_id: Option<DbId>,
    ) -> Result<Option<ProjectLogDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT}
             WHERE l.user_id = $1 AND l.end_time IS NULL
               AND ($2 IS NULL OR l.project_id = $2)
             ORDER BY l.start_time DESC, l.id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, ProjectLogDetail>(&query)
            .bind(user_id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Sessions visible in `scope` matching `criteria`, latest start first.
    pub async fn list(
        pool: &SqlitePool,
        scope: ListScope,
        criteria: &ListCriteria,
    ) -> Result<Vec<ProjectLogDetail>, sqlx::Error> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(DETAIL_SELECT);
        qb.push(" WHERE 1 = 1");
        match scope {
            ListScope::All => {}
            ListScope::Managed(user_id) => {
                qb.push(" AND (l.user_id = ").push_bind(user_id).push(" OR ");
                push_supervises(&mut qb, "l.project_id", user_id);
                qb.push(")");
            }
            ListScope::Own(user_id) => {
                qb.push(" AND l.user_id = ").push_bind(user_id);
            }
        }
        push_criteria(&mut qb, criteria, FILTER_COLUMNS);
        qb.push(" ORDER BY l.start_time DESC, l.id DESC");
        qb.build_query_as::<ProjectLogDetail>().fetch_all(pool).await
    }

    /// Close an open session at `end_time`, recording the elapsed hours.
    ///
    /// The update only matches while `end_time` is unset, so a session is
    /// closed at most once. Returns `None` when nothing was closed.
    pub async fn close(
        pool: &SqlitePool,
        log: &ProjectLog,
        end_time: Timestamp,
    ) -> Result<Option<ProjectLog>, sqlx::Error> {
        let total_time = elapsed_hours(log.start_time, end_time);
        let query = format!(
            "UPDATE project_logs SET end_time = $2, total_time = $3
             WHERE id = $1 AND end_time IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectLog>(&query)
            .bind(log.id)
            .bind(end_time)
            .bind(total_time)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a session. Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_logs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
