//! Task status machine and schedule rule.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const TASK_PENDING: &str = "pending";
pub const TASK_COMPLETED: &str = "completed";
pub const TASK_REJECTED: &str = "rejected";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Rejected,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => TASK_PENDING,
            TaskStatus::Completed => TASK_COMPLETED,
            TaskStatus::Rejected => TASK_REJECTED,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }

    /// Check that a task may move from `self` to `next`.
    ///
    /// Only `pending` may change; staying in the same status is a no-op.
    pub fn ensure_transition(&self, next: TaskStatus) -> Result<(), CoreError> {
        if *self == next || !self.is_terminal() {
            return Ok(());
        }
        Err(CoreError::Validation(format!(
            "Task is already {} and cannot be moved to {}",
            self.as_str(),
            next.as_str()
        )))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            TASK_PENDING => Ok(TaskStatus::Pending),
            TASK_COMPLETED => Ok(TaskStatus::Completed),
            TASK_REJECTED => Ok(TaskStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid task status '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A task cannot be due before it starts. Same-day tasks are allowed.
pub fn validate_schedule(start_date: NaiveDate, due_date: NaiveDate) -> Result<(), CoreError> {
    if due_date < start_date {
        return Err(CoreError::Validation(
            "Due date cannot be before start date".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn due_before_start_fails() {
        assert_matches!(
            validate_schedule(d(2025, 3, 10), d(2025, 3, 9)),
            Err(CoreError::Validation(msg)) if msg.contains("Due date")
        );
    }

    #[test]
    fn same_day_and_later_pass() {
        assert!(validate_schedule(d(2025, 3, 10), d(2025, 3, 10)).is_ok());
        assert!(validate_schedule(d(2025, 3, 10), d(2025, 4, 1)).is_ok());
    }

    #[test]
    fn pending_moves_anywhere() {
        assert!(TaskStatus::Pending
            .ensure_transition(TaskStatus::Completed)
            .is_ok());
        assert!(TaskStatus::Pending
            .ensure_transition(TaskStatus::Rejected)
            .is_ok());
    }

    #[test]
    fn terminal_statuses_are_final() {
        assert!(TaskStatus::Completed
            .ensure_transition(TaskStatus::Pending)
            .is_err());
        assert!(TaskStatus::Rejected
            .ensure_transition(TaskStatus::Completed)
            .is_err());
        assert!(TaskStatus::Completed
            .ensure_transition(TaskStatus::Completed)
            .is_ok());
    }

    #[test]
    fn parses_lowercase_names() {
        assert_eq!("completed".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
        assert!("Completed".parse::<TaskStatus>().is_err());
    }
}
