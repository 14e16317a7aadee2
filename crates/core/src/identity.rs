//! Caller identity and the list scope it implies.
//!
//! Every request resolves to exactly one [`Identity`]. Listing endpoints do
//! not branch per role; they ask the identity for a [`ListScope`] and hand it
//! to the repository, which turns it into a single query predicate.

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// Who is making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// Holder of the configured admin credentials (or a user whose stored
    /// role is `Admin`). Has no user record of its own when authenticated
    /// through the admin console.
    Admin,
    Manager { user_id: DbId },
    Employee { user_id: DbId },
    Anonymous,
}

/// Which records a caller may see in list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// Every record.
    All,
    /// Records the user authored, was assigned, or that belong to projects
    /// the user manages.
    Managed(DbId),
    /// Records the user authored or was assigned.
    Own(DbId),
}

impl Identity {
    /// Identity for an authenticated user record with the given stored role.
    pub fn for_user(user_id: DbId, role: Role) -> Self {
        match role {
            Role::Admin => Identity::Admin,
            Role::Manager => Identity::Manager { user_id },
            Role::User => Identity::Employee { user_id },
        }
    }

    /// The acting user's record id, when the caller has one.
    pub fn user_id(&self) -> Option<DbId> {
        match self {
            Identity::Manager { user_id } | Identity::Employee { user_id } => Some(*user_id),
            Identity::Admin | Identity::Anonymous => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Identity::Admin)
    }

    /// Admins and managers.
    pub fn is_staff(&self) -> bool {
        matches!(self, Identity::Admin | Identity::Manager { .. })
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    /// Role label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Identity::Admin => "admin",
            Identity::Manager { .. } => "manager",
            Identity::Employee { .. } => "employee",
            Identity::Anonymous => "anonymous",
        }
    }

    pub fn list_scope(&self) -> Result<ListScope, CoreError> {
        match *self {
            Identity::Admin => Ok(ListScope::All),
            Identity::Manager { user_id } => Ok(ListScope::Managed(user_id)),
            Identity::Employee { user_id } => Ok(ListScope::Own(user_id)),
            Identity::Anonymous => Err(CoreError::Unauthorized(
                "Not authorized. Login again.".into(),
            )),
        }
    }

    /// Whether this caller may act on a record owned by `owner_id`, either
    /// as staff or as the owner.
    pub fn can_act_for(&self, owner_id: DbId) -> bool {
        self.is_staff() || self.user_id() == Some(owner_id)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn scope_follows_role() {
        assert_eq!(Identity::Admin.list_scope().unwrap(), ListScope::All);
        assert_eq!(
            Identity::Manager { user_id: 4 }.list_scope().unwrap(),
            ListScope::Managed(4)
        );
        assert_eq!(
            Identity::Employee { user_id: 9 }.list_scope().unwrap(),
            ListScope::Own(9)
        );
    }

    #[test]
    fn anonymous_has_no_scope() {
        assert_matches!(
            Identity::Anonymous.list_scope(),
            Err(CoreError::Unauthorized(_))
        );
    }

    #[test]
    fn stored_admin_role_maps_to_admin_identity() {
        assert_eq!(Identity::for_user(3, Role::Admin), Identity::Admin);
        assert_eq!(
            Identity::for_user(3, Role::User),
            Identity::Employee { user_id: 3 }
        );
    }

    #[test]
    fn owner_or_staff_may_act() {
        let employee = Identity::Employee { user_id: 7 };
        assert!(employee.can_act_for(7));
        assert!(!employee.can_act_for(8));
        assert!(Identity::Manager { user_id: 1 }.can_act_for(8));
        assert!(Identity::Admin.can_act_for(8));
        assert!(!Identity::Anonymous.can_act_for(8));
    }
}
