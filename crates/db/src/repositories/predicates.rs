//! Shared WHERE-clause fragments for list queries.
//!
//! Repositories start from a `... WHERE 1 = 1` query and append scope and
//! criteria predicates with [`QueryBuilder`], so binds stay positional no
//! matter which filters are present.

use pmdesk_core::filter::ListCriteria;
use pmdesk_core::types::DbId;
use sqlx::{QueryBuilder, Sqlite};

/// How an entity's list-filter date is stored.
#[derive(Debug, Clone, Copy)]
pub(crate) enum DateColumn {
    /// `TEXT` holding `YYYY-MM-DD`.
    Date(&'static str),
    /// `TEXT` holding an RFC 3339 UTC timestamp.
    Timestamp(&'static str),
}

/// Qualified column names a list query filters on.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FilterColumns {
    pub project: &'static str,
    pub user: &'static str,
    pub employee: &'static str,
    pub date: DateColumn,
}

/// Append `AND ...` for every present criterion.
pub(crate) fn push_criteria(
    qb: &mut QueryBuilder<'_, Sqlite>,
    criteria: &ListCriteria,
    cols: FilterColumns,
) {
    if let Some(project_id) = criteria.project_id {
        qb.push(format!(" AND {} = ", cols.project))
            .push_bind(project_id);
    }
    if let Some(user_id) = criteria.user_id {
        qb.push(format!(" AND {} = ", cols.user)).push_bind(user_id);
    }
    if let Some(employee_id) = &criteria.employee_id {
        qb.push(format!(" AND {} = ", cols.employee))
            .push_bind(employee_id.clone());
    }
    if let Some(range) = criteria.range {
        match cols.date {
            DateColumn::Date(col) => {
                qb.push(format!(" AND {col} >= "))
                    .push_bind(range.from)
                    .push(format!(" AND {col} < "))
                    .push_bind(range.until);
            }
            DateColumn::Timestamp(col) => {
                let (from, until) = range.as_timestamps();
                qb.push(format!(" AND {col} >= "))
                    .push_bind(from)
                    .push(format!(" AND {col} < "))
                    .push_bind(until);
            }
        }
    }
}

/// `EXISTS` clause: `user_id` is a manager or team lead of the project in
/// `project_col`.
pub(crate) fn push_supervises(
    qb: &mut QueryBuilder<'_, Sqlite>,
    project_col: &str,
    user_id: DbId,
) {
    qb.push(format!(
        "EXISTS (SELECT 1 FROM project_members pm \
         WHERE pm.project_id = {project_col} \
         AND pm.assignment IN ('manager', 'team_lead') AND pm.user_id = "
    ))
    .push_bind(user_id)
    .push(")");
}

/// `EXISTS` clause: `user_id` is on any assignment list of the project in
/// `project_col`.
pub(crate) fn push_member_of(
    qb: &mut QueryBuilder<'_, Sqlite>,
    project_col: &str,
    user_id: DbId,
) {
    qb.push(format!(
        "EXISTS (SELECT 1 FROM project_members pm \
         WHERE pm.project_id = {project_col} AND pm.user_id = "
    ))
    .push_bind(user_id)
    .push(")");
}

/// Build `IN (?, ?, ...)` for a non-empty id list.
pub(crate) fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[DbId]) {
    qb.push("(");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}
