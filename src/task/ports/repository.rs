//! Repository ports for tasks, activities, dependency edges, subtasks and
//! tags.
//!
//! Every write that touches a task takes the version the caller loaded.
//! Implementations must reject the write with
//! [`TaskRepositoryError::ConcurrentModification`] when the stored version
//! differs, and must apply each call as a single atomic unit.

use crate::task::domain::{
    Activity, ActivityId, DependencyEdge, Subtask, SubtaskId, Tag, TagId, Task, TaskId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// or [`TaskRepositoryError::ConcurrentModification`] when the stored
    /// version is not `expected_version`.
    async fn update(&self, task: &Task, expected_version: u64) -> TaskRepositoryResult<()>;

    /// Deletes a task together with its activities, subtasks and every
    /// dependency edge touching it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the tasks among `ids` that exist, in the order of `ids`.
    async fn find_by_ids(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns tasks whose due date lies in `[start, end]`, earliest first.
    async fn find_due_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns pending tasks due strictly before `now`, earliest first.
    async fn find_overdue(&self, now: DateTime<Utc>) -> TaskRepositoryResult<Vec<Task>>;
}

/// Activity ledger persistence contract.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Appends `activity` and persists `task` in one write.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// or [`TaskRepositoryError::ConcurrentModification`] on a stale version.
    async fn append_activity(
        &self,
        task: &Task,
        expected_version: u64,
        activity: &Activity,
    ) -> TaskRepositoryResult<()>;

    /// Finds an activity by identifier, regardless of owning task.
    async fn find_activity(&self, id: ActivityId) -> TaskRepositoryResult<Option<Activity>>;

    /// Returns the activities of a task in ledger order.
    async fn list_activities(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Activity>>;

    /// Removes an activity record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::ActivityNotFound`] when it does not
    /// exist.
    async fn delete_activity(&self, id: ActivityId) -> TaskRepositoryResult<()>;
}

/// Dependency edge persistence contract.
#[async_trait]
pub trait DependencyRepository: Send + Sync {
    /// Inserts an edge.
    ///
    /// The cycle check runs against the stored edge set inside the same
    /// atomic write as the insertion, so concurrent inserts of reverse
    /// edges cannot both commit.
    ///
    /// # Errors
    ///
    /// - [`TaskRepositoryError::NotFound`] when either endpoint is missing.
    /// - [`TaskRepositoryError::DuplicateEdge`] when the ordered pair
    ///   already exists.
    /// - [`TaskRepositoryError::DependencyCycle`] when `depends_on` already
    ///   reaches the dependent task.
    async fn insert_edge(&self, edge: DependencyEdge) -> TaskRepositoryResult<()>;

    /// Removes an edge. Returns `false` when it did not exist.
    async fn remove_edge(&self, edge: DependencyEdge) -> TaskRepositoryResult<bool>;

    /// Returns every stored edge.
    async fn list_edges(&self) -> TaskRepositoryResult<Vec<DependencyEdge>>;
}

/// Subtask persistence contract.
#[async_trait]
pub trait SubtaskRepository: Send + Sync {
    /// Returns the subtasks of a task, ascending by order.
    async fn list_subtasks(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Subtask>>;

    /// Upserts `subtasks` and persists the parent `task` in one write.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// or [`TaskRepositoryError::ConcurrentModification`] on a stale version.
    async fn save_subtasks(
        &self,
        task: &Task,
        expected_version: u64,
        subtasks: &[Subtask],
    ) -> TaskRepositoryResult<()>;

    /// Removes a subtask and persists the parent `task` in one write.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist, [`TaskRepositoryError::SubtaskNotFound`] when the subtask does
    /// not, or [`TaskRepositoryError::ConcurrentModification`] on a stale
    /// version.
    async fn remove_subtask(
        &self,
        task: &Task,
        expected_version: u64,
        subtask_id: SubtaskId,
    ) -> TaskRepositoryResult<()>;
}

/// Tag persistence contract.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Stores a new tag.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTagName`] when another tag has
    /// the same normalized name.
    async fn store_tag(&self, tag: &Tag) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing tag.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::TagNotFound`] when the tag does not
    /// exist or [`TaskRepositoryError::DuplicateTagName`] on a name clash.
    async fn update_tag(&self, tag: &Tag) -> TaskRepositoryResult<()>;

    /// Deletes a tag and drops it from every task that references it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::TagNotFound`] when the tag does not
    /// exist.
    async fn delete_tag(&self, id: TagId) -> TaskRepositoryResult<()>;

    /// Persists `task` after attaching `tag_id`, checking in the same
    /// atomic write that the tag still exists.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::TagNotFound`] when the tag is gone,
    /// [`TaskRepositoryError::NotFound`] when the task is, or
    /// [`TaskRepositoryError::ConcurrentModification`] on a stale version.
    async fn save_tagged_task(
        &self,
        task: &Task,
        expected_version: u64,
        tag_id: TagId,
    ) -> TaskRepositoryResult<()>;

    /// Finds a tag by identifier.
    async fn find_tag(&self, id: TagId) -> TaskRepositoryResult<Option<Tag>>;

    /// Finds a tag by case-insensitive name.
    async fn find_tag_by_name(&self, name: &str) -> TaskRepositoryResult<Option<Tag>>;

    /// Returns all tags ordered by name.
    async fn list_tags(&self) -> TaskRepositoryResult<Vec<Tag>>;
}

/// Errors returned by repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The activity was not found.
    #[error("activity not found: {0}")]
    ActivityNotFound(ActivityId),

    /// The subtask was not found.
    #[error("subtask not found: {0}")]
    SubtaskNotFound(SubtaskId),

    /// The tag was not found.
    #[error("tag not found: {0}")]
    TagNotFound(TagId),

    /// The dependency edge already exists.
    #[error("duplicate dependency edge: {} -> {}", .0.task_id(), .0.depends_on())]
    DuplicateEdge(DependencyEdge),

    /// The edge would close a cycle in the stored edge set.
    #[error("dependency edge would create a cycle: {} -> {}", .0.task_id(), .0.depends_on())]
    DependencyCycle(DependencyEdge),

    /// Another tag already uses the name.
    #[error("duplicate tag name: {0}")]
    DuplicateTagName(String),

    /// The task changed since it was loaded.
    #[error("task {task_id} was modified concurrently (expected version {expected}, found {actual})")]
    ConcurrentModification {
        /// Task whose write was rejected.
        task_id: TaskId,
        /// Version the caller loaded.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
