//! Domain types and pure business rules for the project-management backend.
//!
//! Nothing in this crate performs I/O. The store and HTTP crates depend on it
//! for the error taxonomy, role and identity types, list scoping, status
//! machines and the derived-field rules.

pub mod error;
pub mod filter;
pub mod identity;
pub mod performance;
pub mod project;
pub mod roles;
pub mod task;
pub mod timelog;
pub mod types;
pub mod validation;
