//! Error types for the task lifecycle domain.

use super::{ActivityId, ActivityType, SubtaskId, TagId, TaskId, WorkState};
use std::fmt;
use thiserror::Error;

/// Reference to a domain entity, carried by [`TaskDomainError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    /// A task.
    Task(TaskId),
    /// An activity ledger entry.
    Activity(ActivityId),
    /// A subtask.
    Subtask(SubtaskId),
    /// A tag.
    Tag(TagId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(id) => write!(f, "task {id}"),
            Self::Activity(id) => write!(f, "activity {id}"),
            Self::Subtask(id) => write!(f, "subtask {id}"),
            Self::Tag(id) => write!(f, "tag {id}"),
        }
    }
}

/// Why the work-state machine rejected an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum TransitionRejection {
    /// `started` was requested while the task is already active.
    #[error("task is already active")]
    AlreadyActive,
    /// `started` was requested for a completed task.
    #[error("cannot start a completed task")]
    StartCompleted,
    /// `paused` was requested while the task is not active.
    #[error("can only pause an active task")]
    PauseRequiresActive,
    /// `completed` was requested for a completed task.
    #[error("task is already completed")]
    AlreadyCompleted,
}

/// Why the ledger refused to delete an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DeletionRefusal {
    /// The activity carries work time that is part of the task total.
    #[error("it carries {0} seconds of work time and deleting it would corrupt work time calculations")]
    CarriesWorkTime(u64),
    /// The activity is the most recent of its type.
    #[error("it is the most recent {0} activity and explains the current work state")]
    LatestOfType(ActivityType),
}

/// Errors returned by task lifecycle domain operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(EntityRef),

    /// The activity exists but belongs to a different task.
    #[error("activity {activity_id} does not belong to task {task_id}")]
    Forbidden {
        /// Task named by the caller.
        task_id: TaskId,
        /// Activity that belongs elsewhere.
        activity_id: ActivityId,
    },

    /// The work-state machine does not allow the requested activity.
    #[error("cannot record {activity} activity for task {task_id} in state {from}: {reason}")]
    InvalidStateTransition {
        /// Task whose state was checked.
        task_id: TaskId,
        /// Requested activity type.
        activity: ActivityType,
        /// Work state at the time of the request.
        from: WorkState,
        /// Rejection reason.
        reason: TransitionRejection,
    },

    /// The ledger deletion policy refused the deletion.
    #[error("activity {activity_id} cannot be deleted: {reason}")]
    UnauthorizedActivityDeletion {
        /// Activity the caller attempted to delete.
        activity_id: ActivityId,
        /// Policy rule that refused the deletion.
        reason: DeletionRefusal,
    },

    /// A task cannot depend on itself.
    #[error("task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    /// The dependency edge already exists.
    #[error("task {task_id} already depends on task {depends_on}")]
    DependencyExists {
        /// Dependent task.
        task_id: TaskId,
        /// Dependency task.
        depends_on: TaskId,
    },

    /// Adding the edge would close a cycle.
    #[error("adding dependency {task_id} -> {depends_on} would create a cycle")]
    DependencyCycle {
        /// Dependent task.
        task_id: TaskId,
        /// Dependency task.
        depends_on: TaskId,
    },

    /// The dependency edge does not exist.
    #[error("task {task_id} does not depend on task {depends_on}")]
    DependencyNotFound {
        /// Dependent task.
        task_id: TaskId,
        /// Dependency task.
        depends_on: TaskId,
    },

    /// The task has dependencies that are not completed yet.
    #[error("task {task_id} has incomplete dependencies: {}", join_ids(.incomplete))]
    IncompleteDependencies {
        /// Task that was to be completed.
        task_id: TaskId,
        /// Dependencies whose status is still pending.
        incomplete: Vec<TaskId>,
    },

    /// The subtask does not exist under the given task.
    #[error("subtask {subtask_id} not found under task {task_id}")]
    SubtaskNotFound {
        /// Parent task.
        task_id: TaskId,
        /// Missing subtask.
        subtask_id: SubtaskId,
    },

    /// A sibling entity with the same name already exists.
    #[error("name '{0}' already exists")]
    NameExists(String),

    /// The title is empty after trimming.
    #[error("title must not be empty")]
    EmptyTitle,

    /// The title exceeds the configured length limit.
    #[error("title exceeds {max} characters (got {actual})")]
    TitleTooLong {
        /// Configured maximum length in characters.
        max: usize,
        /// Actual length in characters.
        actual: usize,
    },

    /// The tag name is empty after trimming.
    #[error("tag name must not be empty")]
    EmptyTagName,
}

fn join_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error returned while parsing work states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown work state: {0}")]
pub struct ParseWorkStateError(pub String);

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParsePriorityError(pub String);

/// Error returned while parsing activity types from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown activity type: {0}")]
pub struct ParseActivityTypeError(pub String);

/// Error returned while parsing subtask statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown subtask status: {0}")]
pub struct ParseSubtaskStatusError(pub String);
