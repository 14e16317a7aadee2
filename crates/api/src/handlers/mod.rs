pub mod auth;
pub mod cost;
pub mod department;
pub mod performance;
pub mod project;
pub mod project_log;
pub mod task;
pub mod user;
