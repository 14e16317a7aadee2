//! Performance (drawing output) review states.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const REVIEW_PENDING: &str = "pending";
pub const REVIEW_APPROVED: &str = "approved";
pub const REVIEW_REJECTED: &str = "rejected";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => REVIEW_PENDING,
            ReviewStatus::Approved => REVIEW_APPROVED,
            ReviewStatus::Rejected => REVIEW_REJECTED,
        }
    }

    /// Only a pending record can be reviewed; re-applying the current
    /// status is accepted.
    pub fn ensure_transition(&self, next: ReviewStatus) -> Result<(), CoreError> {
        if *self == next || *self == ReviewStatus::Pending {
            return Ok(());
        }
        Err(CoreError::Validation(format!(
            "Performance record is already {} and cannot be moved to {}",
            self.as_str(),
            next.as_str()
        )))
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            REVIEW_PENDING => Ok(ReviewStatus::Pending),
            REVIEW_APPROVED => Ok(ReviewStatus::Approved),
            REVIEW_REJECTED => Ok(ReviewStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid performance status '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for ReviewStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_be_approved_or_rejected() {
        assert!(ReviewStatus::Pending
            .ensure_transition(ReviewStatus::Approved)
            .is_ok());
        assert!(ReviewStatus::Pending
            .ensure_transition(ReviewStatus::Rejected)
            .is_ok());
    }

    #[test]
    fn reviewed_records_do_not_go_back() {
        assert!(ReviewStatus::Approved
            .ensure_transition(ReviewStatus::Pending)
            .is_err());
        assert!(ReviewStatus::Rejected
            .ensure_transition(ReviewStatus::Approved)
            .is_err());
    }

    #[test]
    fn reapplying_is_a_no_op() {
        assert!(ReviewStatus::Approved
            .ensure_transition(ReviewStatus::Approved)
            .is_ok());
    }
}
