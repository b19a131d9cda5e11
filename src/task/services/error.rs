//! Service-level error type.

use crate::task::{
    domain::{EntityRef, Task, TaskDomainError, TaskId},
    ports::{TaskRepository, TaskRepositoryError},
};
use thiserror::Error;

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

impl TaskLifecycleError {
    /// Returns the domain error, if this is one.
    #[must_use]
    pub const fn as_domain(&self) -> Option<&TaskDomainError> {
        match self {
            Self::Domain(err) => Some(err),
            Self::Repository(_) => None,
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Loads a task or fails with [`TaskDomainError::NotFound`].
pub(super) async fn load_task<R>(repository: &R, task_id: TaskId) -> TaskLifecycleResult<Task>
where
    R: TaskRepository + ?Sized,
{
    repository
        .find_by_id(task_id)
        .await?
        .ok_or(TaskLifecycleError::Domain(TaskDomainError::NotFound(
            EntityRef::Task(task_id),
        )))
}
