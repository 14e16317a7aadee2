//! Repository for the `costs` table.
//!
//! Every write recomputes `projects.current_cost` inside the same
//! transaction, so the stored roll-up always equals the sum of the
//! project's surviving cost rows.

use chrono::Utc;
use pmdesk_core::filter::ListCriteria;
use pmdesk_core::identity::ListScope;
use pmdesk_core::types::DbId;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::models::cost::{Cost, CostDetail, CreateCost, UpdateCost};
use crate::repositories::predicates::{
    push_criteria, push_supervises, DateColumn, FilterColumns,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, cost_code, project_id, name, amount, added_by, created_at, updated_at";

const DETAIL_SELECT: &str = "SELECT c.id, c.cost_code, c.project_id, c.name, c.amount, \
        c.added_by, c.created_at, c.updated_at, \
        p.project_code, p.name AS project_name, u.name AS added_by_name \
     FROM costs c \
     LEFT JOIN projects p ON p.id = c.project_id \
     LEFT JOIN users u ON u.id = c.added_by";

const FILTER_COLUMNS: FilterColumns = FilterColumns {
    project: "c.project_id",
    user: "c.added_by",
    employee: "u.employee_id",
    date: DateColumn::Timestamp("c.created_at"),
};

/// Provides CRUD operations for cost entries.
pub struct CostRepo;

impl CostRepo {
    /// Insert a cost entry and refresh its project's `current_cost`.
    pub async fn create(pool: &SqlitePool, input: &CreateCost) -> Result<Cost, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO costs (cost_code, project_id, name, amount, added_by, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {COLUMNS}"
        );
        let cost = sqlx::query_as::<_, Cost>(&query)
            .bind(&input.cost_code)
            .bind(input.project_id)
            .bind(&input.name)
            .bind(input.amount)
            .bind(input.added_by)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        recompute_project_cost(&mut *tx, cost.project_id).await?;

        tx.commit().await?;
        Ok(cost)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Cost>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM costs WHERE id = $1");
        sqlx::query_as::<_, Cost>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Cost>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM costs WHERE cost_code = $1");
        sqlx::query_as::<_, Cost>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_detail(pool: &SqlitePool, id: DbId) -> Result<Option<CostDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE c.id = $1");
        sqlx::query_as::<_, CostDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Cost entries visible in `scope` matching `criteria`, newest first.
    pub async fn list(
        pool: &SqlitePool,
        scope: ListScope,
        criteria: &ListCriteria,
    ) -> Result<Vec<CostDetail>, sqlx::Error> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(DETAIL_SELECT);
        qb.push(" WHERE 1 = 1");
        match scope {
            ListScope::All => {}
            ListScope::Managed(user_id) => {
                qb.push(" AND (c.added_by = ").push_bind(user_id).push(" OR ");
                push_supervises(&mut qb, "c.project_id", user_id);
                qb.push(")");
            }
            ListScope::Own(user_id) => {
                qb.push(" AND c.added_by = ").push_bind(user_id);
            }
        }
        push_criteria(&mut qb, criteria, FILTER_COLUMNS);
        qb.push(" ORDER BY c.created_at DESC, c.id DESC");
        qb.build_query_as::<CostDetail>().fetch_all(pool).await
    }

    /// Update a cost entry. Only non-`None` fields in `input` are applied.
    ///
    /// The owning project is recomputed, and when the entry moved to another
    /// project the previous one is recomputed as well. Returns `None` if no
    /// row with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateCost,
    ) -> Result<Option<Cost>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous: Option<DbId> =
            sqlx::query_scalar("SELECT project_id FROM costs WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(previous) = previous else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE costs SET
                cost_code = COALESCE($2, cost_code),
                project_id = COALESCE($3, project_id),
                name = COALESCE($4, name),
                amount = COALESCE($5, amount),
                updated_at = $6
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let cost = sqlx::query_as::<_, Cost>(&query)
            .bind(id)
            .bind(&input.cost_code)
            .bind(input.project_id)
            .bind(&input.name)
            .bind(input.amount)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        recompute_project_cost(&mut *tx, cost.project_id).await?;
        if previous != cost.project_id {
            recompute_project_cost(&mut *tx, previous).await?;
        }

        tx.commit().await?;
        Ok(Some(cost))
    }

    /// Delete a cost entry and refresh its project's `current_cost`.
    ///
    /// Returns the removed row, or `None` if it did not exist.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<Option<Cost>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("DELETE FROM costs WHERE id = $1 RETURNING {COLUMNS}");
        let removed = sqlx::query_as::<_, Cost>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(cost) = &removed {
            recompute_project_cost(&mut *tx, cost.project_id).await?;
        }

        tx.commit().await?;
        Ok(removed)
    }
}

/// Write the sum of a project's cost rows into `current_cost`. A missing
/// project makes this a no-op.
async fn recompute_project_cost(
    conn: &mut SqliteConnection,
    project_id: DbId,
) -> Result<(), sqlx::Error> {
    let result = sqlx::query(
        "UPDATE projects SET
            current_cost = (SELECT COALESCE(SUM(amount), 0.0) FROM costs WHERE project_id = $1),
            updated_at = $2
         WHERE id = $1",
    )
    .bind(project_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        tracing::debug!(project_id, "Cost roll-up skipped, project not found");
    }
    Ok(())
}
