//! Time-tracking session rules.

use crate::error::CoreError;
use crate::types::Timestamp;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Elapsed time between two instants in fractional hours, never negative.
pub fn elapsed_hours(start: Timestamp, end: Timestamp) -> f64 {
    let millis = (end - start).num_milliseconds().unsigned_abs();
    millis as f64 / MILLIS_PER_HOUR
}

/// Lifecycle of a project log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogState {
    Open,
    Closed,
}

impl LogState {
    pub fn of(end_time: Option<Timestamp>) -> Self {
        match end_time {
            Some(_) => LogState::Closed,
            None => LogState::Open,
        }
    }

    pub fn ensure_open(&self) -> Result<(), CoreError> {
        match self {
            LogState::Open => Ok(()),
            LogState::Closed => Err(CoreError::Conflict(
                "Time log is already closed".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    #[test]
    fn ninety_minutes_is_one_and_a_half_hours() {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
        let end = start + Duration::minutes(90);
        assert!((elapsed_hours(start, end) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn reversed_bounds_stay_positive() {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
        let end = start - Duration::minutes(30);
        assert!((elapsed_hours(start, end) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_length_session() {
        let now = Utc::now();
        assert_eq!(elapsed_hours(now, now), 0.0);
    }

    #[test]
    fn closed_logs_cannot_close_again() {
        assert_eq!(LogState::of(None), LogState::Open);
        assert!(LogState::Open.ensure_open().is_ok());
        assert_matches!(
            LogState::of(Some(Utc::now())).ensure_open(),
            Err(CoreError::Conflict(_))
        );
    }
}
