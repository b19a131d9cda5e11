//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod repository;

#[cfg(test)]
pub use repository::MockTaskRepository;
pub use repository::{
    ActivityRepository, DependencyRepository, SubtaskRepository, TagRepository, TaskRepository,
    TaskRepositoryError, TaskRepositoryResult,
};

