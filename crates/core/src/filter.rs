//! List filter criteria shared by every entity list endpoint.
//!
//! Criteria combine with AND. Date filters are normalised into a half-open
//! [`DateRange`] so repositories only ever emit `>= from AND < until`.

use chrono::{Datelike, Days, NaiveDate, NaiveTime};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Half-open calendar range `[from, until)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub until: NaiveDate,
}

impl DateRange {
    /// The single day `date`.
    pub fn day(date: NaiveDate) -> Result<Self, CoreError> {
        let until = date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| CoreError::Validation(format!("Date out of range: {date}")))?;
        Ok(Self { from: date, until })
    }

    /// Every day of `month` in `year`.
    pub fn month(year: i32, month: u32) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::Validation(format!(
                "Month must be between 1 and 12, got {month}"
            )));
        }
        let from = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| CoreError::Validation(format!("Invalid year {year}")))?;
        let until = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| CoreError::Validation(format!("Invalid year {year}")))?;
        Ok(Self { from, until })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date < self.until
    }

    /// Range bounds as UTC midnights, for timestamp columns.
    pub fn as_timestamps(&self) -> (Timestamp, Timestamp) {
        (
            self.from.and_time(NaiveTime::MIN).and_utc(),
            self.until.and_time(NaiveTime::MIN).and_utc(),
        )
    }

    /// Year and month of the range start.
    pub fn year_month(&self) -> (i32, u32) {
        (self.from.year(), self.from.month())
    }
}

/// Resolve the `date` / `month` / `year` query trio into a range.
///
/// - `date` alone selects one day.
/// - `month` and `year` together select a calendar month.
/// - `year` alone selects the whole year.
/// - `date` combined with `month` or `year` is rejected, as is `month`
///   without `year`.
pub fn resolve_date_range(
    date: Option<NaiveDate>,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<Option<DateRange>, CoreError> {
    match (date, month, year) {
        (None, None, None) => Ok(None),
        (Some(date), None, None) => DateRange::day(date).map(Some),
        (None, Some(month), Some(year)) => DateRange::month(year, month).map(Some),
        (None, None, Some(year)) => {
            let invalid = || CoreError::Validation(format!("Invalid year {year}"));
            let from = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
            let until = year
                .checked_add(1)
                .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1))
                .ok_or_else(invalid)?;
            Ok(Some(DateRange { from, until }))
        }
        (None, Some(_), None) => Err(CoreError::Validation(
            "Month filter requires a year".to_string(),
        )),
        (Some(_), _, _) => Err(CoreError::Validation(
            "Filter by either date or month/year, not both".to_string(),
        )),
    }
}

/// Optional list criteria; all present criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCriteria {
    pub project_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub employee_id: Option<String>,
    pub range: Option<DateRange>,
}

impl ListCriteria {
    pub fn for_project(project_id: DbId) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.project_id.is_none()
            && self.user_id.is_none()
            && self.employee_id.is_none()
            && self.range.is_none()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn out_of_range_year_is_rejected() {
        assert_matches!(
            resolve_date_range(None, None, Some(i32::MAX)),
            Err(CoreError::Validation(msg)) if msg == "Invalid year 2147483647"
        );
        assert_matches!(
            resolve_date_range(None, Some(12), Some(i32::MAX)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn single_day_is_half_open() {
        let range = resolve_date_range(Some(d(2024, 2, 29)), None, None)
            .unwrap()
            .unwrap();
        assert_eq!(range.from, d(2024, 2, 29));
        assert_eq!(range.until, d(2024, 3, 1));
        assert!(range.contains(d(2024, 2, 29)));
        assert!(!range.contains(d(2024, 3, 1)));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let range = DateRange::month(2025, 12).unwrap();
        assert_eq!(range.from, d(2025, 12, 1));
        assert_eq!(range.until, d(2026, 1, 1));
        assert_eq!(range.year_month(), (2025, 12));
    }

    #[test]
    fn month_out_of_bounds_is_rejected() {
        assert_matches!(DateRange::month(2025, 13), Err(CoreError::Validation(_)));
        assert_matches!(DateRange::month(2025, 0), Err(CoreError::Validation(_)));
    }

    #[test]
    fn month_needs_year() {
        assert_matches!(
            resolve_date_range(None, Some(4), None),
            Err(CoreError::Validation(msg)) if msg.contains("requires a year")
        );
    }

    #[test]
    fn date_and_month_are_exclusive() {
        assert_matches!(
            resolve_date_range(Some(d(2025, 4, 2)), Some(4), Some(2025)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn year_alone_covers_the_year() {
        let range = resolve_date_range(None, None, Some(2023)).unwrap().unwrap();
        assert_eq!(range.from, d(2023, 1, 1));
        assert_eq!(range.until, d(2024, 1, 1));
    }

    #[test]
    fn no_criteria_means_no_range() {
        assert_eq!(resolve_date_range(None, None, None).unwrap(), None);
        assert!(ListCriteria::default().is_empty());
        assert!(!ListCriteria::for_project(1).is_empty());
    }

    #[test]
    fn timestamps_are_utc_midnights() {
        let (from, until) = DateRange::day(d(2025, 6, 1)).unwrap().as_timestamps();
        assert_eq!(from.to_rfc3339(), "2025-06-01T00:00:00+00:00");
        assert_eq!(until.to_rfc3339(), "2025-06-02T00:00:00+00:00");
    }
}
