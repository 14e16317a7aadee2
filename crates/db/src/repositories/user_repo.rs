//! Repository for the `users` table.

use chrono::Utc;
use pmdesk_core::types::DbId;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::user::{CreateUser, UpdateUser, User, UserDetail, UserRef};
use crate::repositories::predicates::push_id_list;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, employee_id, name, email, password_hash, phone, department_id, \
                       branch, role, created_at, updated_at";

/// Columns for [`UserDetail`]; expects `users u LEFT JOIN departments d`.
const DETAIL_COLUMNS: &str = "u.id, u.employee_id, u.name, u.email, u.phone, u.department_id, \
                              d.name AS department_name, u.branch, u.role, \
                              u.created_at, u.updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &SqlitePool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (employee_id, name, email, password_hash, phone, department_id, \
                                branch, role, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.employee_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.phone)
            .bind(input.department_id)
            .bind(&input.branch)
            .bind(input.role.as_str())
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_employee_id(
        pool: &SqlitePool,
        employee_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE employee_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(employee_id)
            .fetch_optional(pool)
            .await
    }

    /// Safe view of one user with the department name.
    pub async fn find_detail(pool: &SqlitePool, id: DbId) -> Result<Option<UserDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM users u
             LEFT JOIN departments d ON d.id = u.department_id
             WHERE u.id = $1"
        );
        sqlx::query_as::<_, UserDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List users, optionally restricted to one department, by name.
    pub async fn list(
        pool: &SqlitePool,
        department_id: Option<DbId>,
    ) -> Result<Vec<UserDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM users u
             LEFT JOIN departments d ON d.id = u.department_id
             WHERE ($1 IS NULL OR u.department_id = $1)
             ORDER BY u.name"
        );
        sqlx::query_as::<_, UserDetail>(&query)
            .bind(department_id)
            .fetch_all(pool)
            .await
    }

    /// Which of `ids` do not belong to any user. Empty when all exist.
    pub async fn missing_ids(pool: &SqlitePool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT id FROM users WHERE id IN ");
        push_id_list(&mut qb, ids);
        let found = qb.build_query_scalar::<DbId>().fetch_all(pool).await?;
        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }

    /// User references for a set of ids, in store order.
    pub async fn refs(pool: &SqlitePool, ids: &[DbId]) -> Result<Vec<UserRef>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT id, employee_id, name FROM users WHERE id IN ");
        push_id_list(&mut qb, ids);
        qb.push(" ORDER BY id");
        qb.build_query_as::<UserRef>().fetch_all(pool).await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                employee_id = COALESCE($2, employee_id),
                name = COALESCE($3, name),
                email = COALESCE($4, email),
                password_hash = COALESCE($5, password_hash),
                phone = COALESCE($6, phone),
                department_id = COALESCE($7, department_id),
                branch = COALESCE($8, branch),
                role = COALESCE($9, role),
                updated_at = $10
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.employee_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.phone)
            .bind(input.department_id)
            .bind(&input.branch)
            .bind(input.role.map(|r| r.as_str()))
            .bind(Utc::now())
            .fetch_optional(pool)
            .await
    }

    /// Delete a user. Tasks, logs and assignments referencing the user are
    /// left in place.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
