//! Subtasks and the parent completion roll-up.

use super::{ParseSubtaskStatusError, SubtaskId, Task, TaskDomainError, TaskId, Title};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;

/// Completion status of a subtask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtaskStatus {
    /// Subtask still has work left.
    Incomplete,
    /// Subtask is done.
    Completed,
}

impl SubtaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for SubtaskStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SubtaskStatus {
    type Error = ParseSubtaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "incomplete" => Ok(Self::Incomplete),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseSubtaskStatusError(value.to_owned())),
        }
    }
}

/// Child unit of work owned by a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    id: SubtaskId,
    task_id: TaskId,
    title: Title,
    description: Option<String>,
    status: SubtaskStatus,
    order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted subtask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSubtaskData {
    /// Persisted subtask identifier.
    pub id: SubtaskId,
    /// Owning task.
    pub task_id: TaskId,
    /// Persisted title.
    pub title: Title,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted status.
    pub status: SubtaskStatus,
    /// Persisted sort order.
    pub order: i32,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Subtask {
    /// Creates an incomplete subtask at `order` under `task_id`.
    #[must_use]
    pub fn new(task_id: TaskId, title: Title, order: i32, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: SubtaskId::new(),
            task_id,
            title,
            description: None,
            status: SubtaskStatus::Incomplete,
            order,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Sets the subtask description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Reconstructs a subtask from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedSubtaskData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            title: data.title,
            description: data.description,
            status: data.status,
            order: data.order,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the subtask identifier.
    #[must_use]
    pub const fn id(&self) -> SubtaskId {
        self.id
    }

    /// Returns the owning task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &Title {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> SubtaskStatus {
        self.status
    }

    /// Returns whether the subtask is done.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.status, SubtaskStatus::Completed)
    }

    /// Returns the sort order.
    #[must_use]
    pub const fn order(&self) -> i32 {
        self.order
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Sets the status. Returns `false` when the status was unchanged.
    pub fn set_status(&mut self, status: SubtaskStatus, clock: &impl Clock) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        self.updated_at = clock.utc();
        true
    }

    fn set_order(&mut self, order: i32, now: DateTime<Utc>) {
        if self.order != order {
            self.order = order;
            self.updated_at = now;
        }
    }
}

/// Derived completion of a parent task.
///
/// `true` only when there is at least one subtask and all are completed.
#[must_use]
pub fn derived_completion(subtasks: &[Subtask]) -> bool {
    !subtasks.is_empty() && subtasks.iter().all(Subtask::is_completed)
}

/// Recomputes and stores the derived completion flag on `task`.
///
/// Only the flag is written; work state and status are never touched.
/// Returns the recomputed value.
pub fn recompute_completion(task: &mut Task, subtasks: &[Subtask], clock: &impl Clock) -> bool {
    let completed = derived_completion(subtasks);
    task.set_subtasks_completed(completed, clock.utc());
    completed
}

/// Order value for a subtask appended after `subtasks`.
#[must_use]
pub fn next_order(subtasks: &[Subtask]) -> i32 {
    subtasks
        .iter()
        .map(Subtask::order)
        .max()
        .map_or(0, |highest| highest.saturating_add(1))
}

/// Sorts subtasks ascending by order, keeping the relative position of
/// equal orders.
pub fn sort_subtasks(subtasks: &mut [Subtask]) {
    subtasks.sort_by_key(Subtask::order);
}

/// Applies new order values and re-sorts the list.
///
/// Every id in `id_to_order` is checked before anything changes; subtasks
/// not named keep their order.
///
/// # Errors
///
/// Returns [`TaskDomainError::SubtaskNotFound`] for the first id (in
/// identifier order) that is not one of `subtasks`.
pub fn reorder_subtasks<S: BuildHasher>(
    task_id: TaskId,
    subtasks: &mut [Subtask],
    id_to_order: &HashMap<SubtaskId, i32, S>,
    clock: &impl Clock,
) -> Result<(), TaskDomainError> {
    let mut requested: Vec<SubtaskId> = id_to_order.keys().copied().collect();
    requested.sort();
    if let Some(missing) = requested
        .into_iter()
        .find(|id| !subtasks.iter().any(|subtask| subtask.id() == *id))
    {
        return Err(TaskDomainError::SubtaskNotFound {
            task_id,
            subtask_id: missing,
        });
    }

    let now = clock.utc();
    for subtask in subtasks.iter_mut() {
        if let Some(order) = id_to_order.get(&subtask.id()) {
            subtask.set_order(*order, now);
        }
    }
    sort_subtasks(subtasks);
    Ok(())
}
