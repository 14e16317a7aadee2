//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&SqlitePool` as the first argument.

pub(crate) mod predicates;

pub mod cost_repo;
pub mod department_repo;
pub mod performance_repo;
pub mod project_log_repo;
pub mod project_repo;
pub mod task_repo;
pub mod user_repo;

pub use cost_repo::CostRepo;
pub use department_repo::DepartmentRepo;
pub use performance_repo::PerformanceRepo;
pub use project_log_repo::ProjectLogRepo;
pub use project_repo::ProjectRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
