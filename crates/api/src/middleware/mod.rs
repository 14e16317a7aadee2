//! Authentication and authorization extractors.
//!
//! - [`auth::Caller`] -- resolves the `atoken` / `mtoken` / `token` headers.
//! - [`rbac::RequireAdmin`] -- admin only.
//! - [`rbac::RequireStaff`] -- admin or manager.
//! - [`rbac::RequireMember`] -- manager or employee (has a user record).
//! - [`rbac::RequireAuth`] -- any authenticated caller.

pub mod auth;
pub mod rbac;
