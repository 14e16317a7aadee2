//! Repository for the `performances` and `performance_releases` tables.

use std::collections::HashMap;

use chrono::Utc;
use pmdesk_core::filter::{DateRange, ListCriteria};
use pmdesk_core::identity::ListScope;
use pmdesk_core::performance::ReviewStatus;
use pmdesk_core::types::DbId;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::models::performance::{
    CreatePerformance, DrawingTotal, Performance, PerformanceDetail, PerformanceRow,
    UpdatePerformance,
};
use crate::models::user::UserRef;
use crate::repositories::predicates::{
    push_criteria, push_id_list, push_supervises, DateColumn, FilterColumns,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, performance_code, project_id, user_id, drawing_type, drawings, date, \
                       status, created_at, updated_at";

const ROW_SELECT: &str = "SELECT f.id, f.performance_code, f.project_id, f.user_id, \
        f.drawing_type, f.drawings, f.date, f.status, f.created_at, f.updated_at, \
        p.project_code, p.name AS project_name, u.employee_id, u.name AS user_name \
     FROM performances f \
     LEFT JOIN projects p ON p.id = f.project_id \
     LEFT JOIN users u ON u.id = f.user_id";

const FILTER_COLUMNS: FilterColumns = FilterColumns {
    project: "f.project_id",
    user: "f.user_id",
    employee: "u.employee_id",
    date: DateColumn::Date("f.date"),
};

#[derive(Debug, FromRow)]
struct ReleaseRow {
    performance_id: DbId,
    id: DbId,
    employee_id: String,
    name: String,
}

/// Provides CRUD and reporting operations for performance records.
pub struct PerformanceRepo;

impl PerformanceRepo {
    /// Insert a new record in `pending` status together with its release list.
    pub async fn create(
        pool: &SqlitePool,
        input: &CreatePerformance,
    ) -> Result<Performance, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO performances (performance_code, project_id, user_id, drawing_type, \
                                       drawings, date, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING {COLUMNS}"
        );
        let performance = sqlx::query_as::<_, Performance>(&query)
            .bind(&input.performance_code)
            .bind(input.project_id)
            .bind(input.user_id)
            .bind(&input.drawing_type)
            .bind(input.drawings)
            .bind(input.date)
            .bind(ReviewStatus::Pending.as_str())
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        replace_releases(&mut *tx, performance.id, &input.drawing_released).await?;

        tx.commit().await?;
        Ok(performance)
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<Performance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM performances WHERE id = $1");
        sqlx::query_as::<_, Performance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_code(
        pool: &SqlitePool,
        code: &str,
    ) -> Result<Option<Performance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM performances WHERE performance_code = $1");
        sqlx::query_as::<_, Performance>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_detail(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<PerformanceDetail>, sqlx::Error> {
        let query = format!("{ROW_SELECT} WHERE f.id = $1");
        let row = sqlx::query_as::<_, PerformanceRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut details = attach_releases(pool, vec![row]).await?;
        Ok(details.pop())
    }

    /// User ids the record was released to.
    pub async fn released_to(pool: &SqlitePool, id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT user_id FROM performance_releases WHERE performance_id = $1 ORDER BY user_id",
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }

    /// Records visible in `scope` matching `criteria`, latest date first.
    pub async fn list(
        pool: &SqlitePool,
        scope: ListScope,
        criteria: &ListCriteria,
    ) -> Result<Vec<PerformanceDetail>, sqlx::Error> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(ROW_SELECT);
        qb.push(" WHERE 1 = 1");
        push_scope(&mut qb, scope);
        push_criteria(&mut qb, criteria, FILTER_COLUMNS);
        qb.push(" ORDER BY f.date DESC, f.id DESC");

        let rows = qb.build_query_as::<PerformanceRow>().fetch_all(pool).await?;
        attach_releases(pool, rows).await
    }

    /// Drawing totals per author for records dated inside `range`.
    pub async fn totals(
        pool: &SqlitePool,
        scope: ListScope,
        range: DateRange,
        project_id: Option<DbId>,
    ) -> Result<Vec<DrawingTotal>, sqlx::Error> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT f.user_id, u.employee_id, u.name AS user_name, \
                    COUNT(*) AS records, \
                    COALESCE(SUM(f.drawings), 0) AS drawings, \
                    COALESCE(SUM(CASE WHEN f.status = 'approved' THEN f.drawings ELSE 0 END), 0) \
                        AS approved_drawings \
             FROM performances f \
             LEFT JOIN users u ON u.id = f.user_id \
             WHERE 1 = 1",
        );
        push_scope(&mut qb, scope);
        let criteria = ListCriteria {
            project_id,
            range: Some(range),
            ..ListCriteria::default()
        };
        push_criteria(&mut qb, &criteria, FILTER_COLUMNS);
        qb.push(" GROUP BY f.user_id, u.employee_id, u.name ORDER BY drawings DESC, f.user_id");
        qb.build_query_as::<DrawingTotal>().fetch_all(pool).await
    }

    /// Update a record. Only non-`None` fields in `input` are applied; a
    /// provided release list replaces the stored one.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdatePerformance,
    ) -> Result<Option<Performance>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE performances SET
                performance_code = COALESCE($2, performance_code),
                project_id = COALESCE($3, project_id),
                drawing_type = COALESCE($4, drawing_type),
                drawings = COALESCE($5, drawings),
                date = COALESCE($6, date),
                status = COALESCE($7, status),
                updated_at = $8
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let performance = sqlx::query_as::<_, Performance>(&query)
            .bind(id)
            .bind(&input.performance_code)
            .bind(input.project_id)
            .bind(&input.drawing_type)
            .bind(input.drawings)
            .bind(input.date)
            .bind(input.status.map(|s| s.as_str()))
            .bind(Utc::now())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(performance) = performance else {
            return Ok(None);
        };

        if let Some(released) = &input.drawing_released {
            replace_releases(&mut *tx, id, released).await?;
        }

        tx.commit().await?;
        Ok(Some(performance))
    }

    /// Delete a record and its release rows. Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM performance_releases WHERE performance_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM performances WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Authored by, released to, or (for managers) on a supervised project.
fn push_scope(qb: &mut QueryBuilder<'_, Sqlite>, scope: ListScope) {
    let (user_id, supervised) = match scope {
        ListScope::All => return,
        ListScope::Managed(user_id) => (user_id, true),
        ListScope::Own(user_id) => (user_id, false),
    };
    qb.push(" AND (f.user_id = ")
        .push_bind(user_id)
        .push(
            " OR EXISTS (SELECT 1 FROM performance_releases r \
             WHERE r.performance_id = f.id AND r.user_id = ",
        )
        .push_bind(user_id)
        .push(")");
    if supervised {
        qb.push(" OR ");
        push_supervises(qb, "f.project_id", user_id);
    }
    qb.push(")");
}

async fn replace_releases(
    conn: &mut SqliteConnection,
    performance_id: DbId,
    user_ids: &[DbId],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM performance_releases WHERE performance_id = $1")
        .bind(performance_id)
        .execute(&mut *conn)
        .await?;

    for user_id in user_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO performance_releases (performance_id, user_id) VALUES ($1, $2)",
        )
        .bind(performance_id)
        .bind(*user_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn attach_releases(
    pool: &SqlitePool,
    rows: Vec<PerformanceRow>,
) -> Result<Vec<PerformanceDetail>, sqlx::Error> {
    let mut grouped: HashMap<DbId, Vec<UserRef>> = HashMap::new();
    if !rows.is_empty() {
        let ids: Vec<DbId> = rows.iter().map(|r| r.performance.id).collect();
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT r.performance_id, u.id, u.employee_id, u.name
             FROM performance_releases r
             JOIN users u ON u.id = r.user_id
             WHERE r.performance_id IN ",
        );
        push_id_list(&mut qb, &ids);
        qb.push(" ORDER BY u.name");
        for release in qb.build_query_as::<ReleaseRow>().fetch_all(pool).await? {
            grouped
                .entry(release.performance_id)
                .or_default()
                .push(UserRef {
                    id: release.id,
                    employee_id: release.employee_id,
                    name: release.name,
                });
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let released = grouped.remove(&row.performance.id).unwrap_or_default();
            PerformanceDetail::from_row(row, released)
        })
        .collect())
}
