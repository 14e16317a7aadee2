//! Store row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the table row
//! - A detail struct with referenced project/user fields joined in, where
//!   list views need them
//! - A create DTO for inserts and an update DTO (all `Option` fields) for
//!   partial edits

pub mod cost;
pub mod department;
pub mod performance;
pub mod project;
pub mod project_log;
pub mod task;
pub mod user;
