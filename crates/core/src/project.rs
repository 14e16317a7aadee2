//! Project membership and access rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Status given to projects created without one.
pub const DEFAULT_PROJECT_STATUS: &str = "Yet to Start";

/// Which assignment list a project member belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignment {
    Manager,
    TeamLead,
    Resource,
}

impl Assignment {
    pub const ALL: [Assignment; 3] = [
        Assignment::Manager,
        Assignment::TeamLead,
        Assignment::Resource,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Assignment::Manager => "manager",
            Assignment::TeamLead => "team_lead",
            Assignment::Resource => "resource",
        }
    }

    /// Assignments that give a manager oversight of a project.
    pub fn is_supervisory(&self) -> bool {
        matches!(self, Assignment::Manager | Assignment::TeamLead)
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Assignment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manager" => Ok(Assignment::Manager),
            "team_lead" => Ok(Assignment::TeamLead),
            "resource" => Ok(Assignment::Resource),
            other => Err(CoreError::Validation(format!(
                "Invalid project assignment '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for Assignment {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Collapse an assignment list into a set, keeping first-seen order.
pub fn dedupe_members(ids: &[DbId]) -> Vec<DbId> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}

/// Check the password a member types to start tracking time on a project.
///
/// Project passwords are stored and compared as plaintext. Existing stored
/// values depend on this, so the comparison is kept as is.
pub fn verify_project_password(stored: &str, supplied: &str) -> Result<(), CoreError> {
    if stored == supplied {
        Ok(())
    } else {
        Err(CoreError::Unauthorized(
            "Incorrect project password".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn dedupe_keeps_first_occurrence_order() {
        assert_eq!(dedupe_members(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(dedupe_members(&[]).is_empty());
    }

    #[test]
    fn password_is_exact_match() {
        assert!(verify_project_password("Site-42", "Site-42").is_ok());
        assert_matches!(
            verify_project_password("Site-42", "site-42"),
            Err(CoreError::Unauthorized(_))
        );
    }

    #[test]
    fn assignment_round_trips_through_store_names() {
        for a in Assignment::ALL {
            assert_eq!(a.as_str().parse::<Assignment>().unwrap(), a);
        }
        assert!(Assignment::TeamLead.is_supervisory());
        assert!(!Assignment::Resource.is_supervisory());
    }
}
