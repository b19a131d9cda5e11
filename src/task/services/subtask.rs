//! Service layer for subtasks and the parent completion roll-up.

use super::{LifecycleConfig, TaskLifecycleResult, error::load_task};
use crate::task::{
    domain::{
        Subtask, SubtaskId, SubtaskStatus, TaskDomainError, TaskId, Title, next_order,
        recompute_completion, reorder_subtasks,
    },
    ports::{SubtaskRepository, TaskRepository},
};
use mockable::Clock;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Arc;

/// Request payload for adding a subtask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddSubtaskRequest {
    task_id: TaskId,
    title: String,
    description: Option<String>,
}

impl AddSubtaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(task_id: TaskId, title: impl Into<String>) -> Self {
        Self {
            task_id,
            title: title.into(),
            description: None,
        }
    }

    /// Sets the subtask description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Subtask orchestration service.
///
/// Every mutation recomputes the parent's derived completion flag and
/// persists subtasks and parent together.
#[derive(Clone)]
pub struct SubtaskService<S, C>
where
    S: TaskRepository + SubtaskRepository,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    config: LifecycleConfig,
}

impl<S, C> SubtaskService<S, C>
where
    S: TaskRepository + SubtaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new subtask service with default configuration.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self::with_config(store, clock, LifecycleConfig::default())
    }

    /// Creates a new subtask service with custom configuration.
    #[must_use]
    pub const fn with_config(store: Arc<S>, clock: Arc<C>, config: LifecycleConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Appends a subtask after the existing ones.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist, a title validation
    /// error, or a repository error.
    pub async fn add_subtask(&self, request: AddSubtaskRequest) -> TaskLifecycleResult<Subtask> {
        let mut task = load_task(&*self.store, request.task_id).await?;
        let title = Title::new(request.title, self.config.max_title_length)?;
        let mut subtasks = self.store.list_subtasks(task.id()).await?;

        let mut subtask = Subtask::new(task.id(), title, next_order(&subtasks), &*self.clock);
        if let Some(description) = request.description {
            subtask = subtask.with_description(description);
        }
        subtasks.push(subtask.clone());

        recompute_completion(&mut task, &subtasks, &*self.clock);
        let expected_version = task.version();
        task.advance_version();
        self.store
            .save_subtasks(&task, expected_version, std::slice::from_ref(&subtask))
            .await?;
        Ok(subtask)
    }

    /// Changes a subtask's status.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist, `SubtaskNotFound`
    /// when the subtask is not one of the task's, or a repository error.
    pub async fn set_subtask_status(
        &self,
        task_id: TaskId,
        subtask_id: SubtaskId,
        status: SubtaskStatus,
    ) -> TaskLifecycleResult<Subtask> {
        let mut task = load_task(&*self.store, task_id).await?;
        let mut subtasks = self.store.list_subtasks(task_id).await?;
        let subtask = subtasks
            .iter_mut()
            .find(|subtask| subtask.id() == subtask_id)
            .ok_or(TaskDomainError::SubtaskNotFound {
                task_id,
                subtask_id,
            })?;
        if !subtask.set_status(status, &*self.clock) {
            return Ok(subtask.clone());
        }
        let updated = subtask.clone();

        recompute_completion(&mut task, &subtasks, &*self.clock);
        let expected_version = task.version();
        task.advance_version();
        self.store
            .save_subtasks(&task, expected_version, std::slice::from_ref(&updated))
            .await?;
        Ok(updated)
    }

    /// Applies new order values and returns the re-sorted list.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist or `SubtaskNotFound`
    /// when a named subtask is not one of the task's. Nothing changes on
    /// error.
    pub async fn reorder_subtasks<H>(
        &self,
        task_id: TaskId,
        id_to_order: &HashMap<SubtaskId, i32, H>,
    ) -> TaskLifecycleResult<Vec<Subtask>>
    where
        H: BuildHasher + Sync,
    {
        let mut task = load_task(&*self.store, task_id).await?;
        let mut subtasks = self.store.list_subtasks(task_id).await?;
        reorder_subtasks(task_id, &mut subtasks, id_to_order, &*self.clock)?;

        recompute_completion(&mut task, &subtasks, &*self.clock);
        let expected_version = task.version();
        task.advance_version();
        self.store
            .save_subtasks(&task, expected_version, &subtasks)
            .await?;
        Ok(subtasks)
    }

    /// Removes a subtask.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist, `SubtaskNotFound`
    /// when the subtask is not one of the task's, or a repository error.
    pub async fn remove_subtask(
        &self,
        task_id: TaskId,
        subtask_id: SubtaskId,
    ) -> TaskLifecycleResult<()> {
        let mut task = load_task(&*self.store, task_id).await?;
        let mut subtasks = self.store.list_subtasks(task_id).await?;
        let position = subtasks
            .iter()
            .position(|subtask| subtask.id() == subtask_id)
            .ok_or(TaskDomainError::SubtaskNotFound {
                task_id,
                subtask_id,
            })?;
        subtasks.remove(position);

        recompute_completion(&mut task, &subtasks, &*self.clock);
        let expected_version = task.version();
        task.advance_version();
        self.store
            .remove_subtask(&task, expected_version, subtask_id)
            .await?;
        Ok(())
    }

    /// Returns a task's subtasks ascending by order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist.
    pub async fn list_subtasks(&self, task_id: TaskId) -> TaskLifecycleResult<Vec<Subtask>> {
        load_task(&*self.store, task_id).await?;
        Ok(self.store.list_subtasks(task_id).await?)
    }
}
