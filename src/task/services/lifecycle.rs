//! Service layer for task creation, editing, deletion and due-date queries.

use super::{LifecycleConfig, TaskLifecycleResult, error::load_task};
use crate::task::{
    domain::{Priority, Task, TaskId, TaskUpdate, Title},
    ports::TaskRepository,
};
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use std::sync::Arc;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    due_date: Option<DateTime<Utc>>,
    priority: Option<Priority>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            priority: None,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the task due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the task priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    config: LifecycleConfig,
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service with default configuration.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self::with_config(repository, clock, LifecycleConfig::default())
    }

    /// Creates a new task lifecycle service with custom configuration.
    #[must_use]
    pub const fn with_config(repository: Arc<R>, clock: Arc<C>, config: LifecycleConfig) -> Self {
        Self {
            repository,
            clock,
            config,
        }
    }

    /// Returns the service configuration.
    #[must_use]
    pub const fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Creates and stores a new idle task.
    ///
    /// # Errors
    ///
    /// Returns a domain error for an invalid title, or a repository error
    /// when persistence fails.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let title = Title::new(request.title, self.config.max_title_length)?;
        let mut task = Task::new(title, &*self.clock);
        if let Some(description) = request.description {
            task = task.with_description(description);
        }
        if let Some(due_date) = request.due_date {
            task = task.with_due_date(due_date);
        }
        if let Some(priority) = request.priority {
            task = task.with_priority(priority);
        }
        self.repository.store(&task).await?;
        Ok(task)
    }

    /// Finds a task by identifier.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskLifecycleError::Repository`] when lookup fails.
    pub async fn find_by_id(&self, task_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.repository.find_by_id(task_id).await?)
    }

    /// Loads a task that must exist.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist.
    pub async fn get(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        load_task(&*self.repository, task_id).await
    }

    /// Applies an explicit field patch to a task.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, a title validation error, or a repository error
    /// (including a concurrent modification).
    pub async fn update_task(
        &self,
        task_id: TaskId,
        update: TaskUpdate,
    ) -> TaskLifecycleResult<Task> {
        let mut task = load_task(&*self.repository, task_id).await?;
        if update.is_empty() {
            return Ok(task);
        }
        task.apply_update(update, self.config.max_title_length, &*self.clock)?;
        let expected_version = task.version();
        task.advance_version();
        self.repository.update(&task, expected_version).await?;
        Ok(task)
    }

    /// Deletes a task along with its activities, subtasks and dependency
    /// edges.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist.
    pub async fn delete_task(&self, task_id: TaskId) -> TaskLifecycleResult<()> {
        load_task(&*self.repository, task_id).await?;
        self.repository.delete(task_id).await?;
        Ok(())
    }

    /// Returns pending tasks due before `now`, or before the clock's current
    /// instant when `now` is `None`.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the query fails.
    pub async fn find_overdue(&self, now: Option<DateTime<Utc>>) -> TaskLifecycleResult<Vec<Task>> {
        let instant = now.unwrap_or_else(|| self.clock.utc());
        Ok(self.repository.find_overdue(instant).await?)
    }

    /// Returns tasks due between now and `days` days from now, inclusive.
    ///
    /// A window reaching past the latest representable instant is clamped
    /// to it.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the query fails.
    pub async fn find_due_soon(&self, days: u32) -> TaskLifecycleResult<Vec<Task>> {
        let now = self.clock.utc();
        let end = Duration::try_days(i64::from(days))
            .and_then(|window| now.checked_add_signed(window))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Ok(self.repository.find_due_between(now, end).await?)
    }

    /// Same as [`Self::find_due_soon`] with the configured default window.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the query fails.
    pub async fn find_due_soon_default(&self) -> TaskLifecycleResult<Vec<Task>> {
        self.find_due_soon(self.config.due_soon_default_days).await
    }

    /// Returns tasks due within `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the query fails.
    pub async fn find_by_due_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.find_due_between(start, end).await?)
    }
}
