//! Shared query parameter types for list endpoints.

use chrono::NaiveDate;
use pmdesk_core::error::CoreError;
use pmdesk_core::filter::{resolve_date_range, ListCriteria};
use pmdesk_core::types::DbId;
use serde::Deserialize;

/// `?project_id=&user_id=&employee_id=&date=&month=&year=`.
///
/// Every parameter is optional; present ones are combined with AND.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListParams {
    pub project_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub employee_id: Option<String>,
    /// `YYYY-MM-DD`.
    pub date: Option<NaiveDate>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl ListParams {
    /// Resolve into repository criteria, rejecting contradictory date filters.
    pub fn into_criteria(self) -> Result<ListCriteria, CoreError> {
        let range = resolve_date_range(self.date, self.month, self.year)?;
        Ok(ListCriteria {
            project_id: self.project_id,
            user_id: self.user_id,
            employee_id: self.employee_id.filter(|e| !e.trim().is_empty()),
            range,
        })
    }
}

/// `?month=&year=` for monthly reports.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonthParams {
    pub month: u32,
    pub year: i32,
    pub project_id: Option<DbId>,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_empty_params_match_everything() {
        let criteria = ListParams::default().into_criteria().unwrap();
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_month_and_year_become_a_range() {
        let params = ListParams {
            month: Some(2),
            year: Some(2026),
            ..ListParams::default()
        };
        let range = params.into_criteria().unwrap().range.unwrap();
        assert_eq!(range.from, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(range.until, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }

    #[test]
    fn test_blank_employee_id_is_ignored() {
        let params = ListParams {
            employee_id: Some("  ".into()),
            ..ListParams::default()
        };
        assert_eq!(params.into_criteria().unwrap().employee_id, None);
    }

    #[test]
    fn test_date_with_month_is_rejected() {
        let params = ListParams {
            date: NaiveDate::from_ymd_opt(2026, 2, 3),
            month: Some(2),
            year: Some(2026),
            ..ListParams::default()
        };
        assert_matches!(params.into_criteria(), Err(CoreError::Validation(_)));
    }
}
